use eframe_photo::{
    AiEditResult, AiEditService, EditedImage, Editor, EditorConfig, EditorError, ImageFile,
    LayerKind, MemoryStorage, ServiceError,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::Arc;
use std::task::{Context, Poll};

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// Answers every call with the same canned result and records the prompts.
struct ScriptedService {
    response: Result<AiEditResult, ServiceError>,
    calls: Mutex<Vec<(usize, String, String)>>,
}

impl ScriptedService {
    fn new(response: Result<AiEditResult, ServiceError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl AiEditService for ScriptedService {
    fn edit_image(
        &self,
        bytes: Vec<u8>,
        mime_type: String,
        prompt: String,
    ) -> BoxFuture<'static, Result<AiEditResult, ServiceError>> {
        self.calls.lock().push((bytes.len(), mime_type, prompt));
        futures::future::ready(self.response.clone()).boxed()
    }
}

/// Never finishes.
struct StuckService;

impl AiEditService for StuckService {
    fn edit_image(
        &self,
        _bytes: Vec<u8>,
        _mime_type: String,
        _prompt: String,
    ) -> BoxFuture<'static, Result<AiEditResult, ServiceError>> {
        futures::future::pending().boxed()
    }
}

fn edited(text: Option<&str>) -> AiEditResult {
    AiEditResult {
        edited_image: Some(EditedImage {
            bytes: png(32, 32, [0, 200, 0, 255]),
            mime_type: "image/png".into(),
        }),
        text_response: text.map(str::to_owned),
    }
}

fn editor_with(service: Arc<dyn AiEditService>) -> Editor {
    let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()))
        .with_ai_service(service);
    editor
        .load_image(ImageFile::new("scene.png", "image/png", png(32, 32, [0, 0, 0, 255])))
        .unwrap();
    editor
}

#[test]
fn blank_prompt_never_reaches_the_service() {
    let service = ScriptedService::new(Ok(edited(None)));
    let mut editor = editor_with(service.clone());
    editor.set_prompt("   ");

    let result = editor.request_ai_edit();
    assert!(matches!(result, Err(EditorError::InputValidation(_))));
    assert_eq!(
        editor.ai_panel().error.as_deref(),
        Some("Please upload an image and enter a prompt.")
    );
    assert!(!editor.ai_panel().is_loading);
    assert_eq!(service.call_count(), 0);
}

#[test]
fn missing_image_never_reaches_the_service() {
    let service = ScriptedService::new(Ok(edited(None)));
    let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()))
        .with_ai_service(service.clone());
    editor.set_prompt("add a moon");

    assert!(matches!(
        editor.run_ai_edit(),
        Err(EditorError::InputValidation(_))
    ));
    assert_eq!(service.call_count(), 0);
}

#[test]
fn successful_edit_adds_named_active_layer() {
    let service = ScriptedService::new(Ok(edited(Some("Here you go"))));
    let mut editor = editor_with(service.clone());
    editor.set_prompt("Add a dragon flying in the sky");

    let id = editor.run_ai_edit().unwrap();

    assert_eq!(editor.layers().len(), 2);
    let layer = &editor.layers()[1];
    assert_eq!(layer.id, id);
    assert_eq!(layer.name, "Add a dragon flying ");
    assert!(layer.visible);
    assert!(matches!(layer.kind, LayerKind::Image(_)));
    assert_eq!(editor.document().active_layer_id(), Some(id));

    let panel = editor.ai_panel();
    assert!(!panel.is_loading);
    assert_eq!(panel.error, None);
    assert_eq!(panel.text_response.as_deref(), Some("Here you go"));

    let calls = service.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "image/png");
    assert_eq!(calls[0].2, "Add a dragon flying in the sky");

    let p = editor.surface().unwrap().pixel(16, 16).unwrap();
    assert_eq!((p.red(), p.green(), p.blue()), (0, 200, 0));
}

#[test]
fn result_without_image_is_a_service_error() {
    let service = ScriptedService::new(Ok(AiEditResult {
        edited_image: None,
        text_response: Some("I cannot do that".into()),
    }));
    let mut editor = editor_with(service);
    editor.set_prompt("make it pop");

    let err = editor.run_ai_edit().unwrap_err();
    assert!(matches!(err, EditorError::Service(_)));
    assert_eq!(editor.layers().len(), 1);

    let panel = editor.ai_panel();
    assert!(!panel.is_loading);
    assert!(panel.error.as_deref().unwrap().contains("API did not return an edited image."));
    assert!(!editor.is_ai_loading());
}

#[test]
fn service_failure_is_surfaced() {
    let service = ScriptedService::new(Err(ServiceError::new("quota exceeded")));
    let mut editor = editor_with(service);
    editor.set_prompt("make it pop");

    assert!(editor.run_ai_edit().is_err());
    assert!(editor.ai_panel().error.as_deref().unwrap().contains("quota exceeded"));
    assert!(!editor.ai_panel().is_loading);
}

#[test]
fn second_request_while_in_flight_is_rejected() {
    let mut editor = editor_with(Arc::new(StuckService));
    editor.set_prompt("make it pop");

    editor.request_ai_edit().unwrap();
    assert!(editor.ai_panel().is_loading);
    assert!(matches!(editor.request_ai_edit(), Err(EditorError::AiBusy)));

    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(editor.poll_ai_edit(&mut cx).is_pending());
    assert!(editor.is_ai_loading());
}

#[test]
fn polling_drives_the_request_to_completion() {
    let mut editor = editor_with(ScriptedService::new(Ok(edited(None))));
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(matches!(editor.poll_ai_edit(&mut cx), Poll::Ready(None)));

    editor.set_prompt("");
    editor.set_prompt("x");
    editor.request_ai_edit().unwrap();
    let Poll::Ready(Some(Ok(id))) = editor.poll_ai_edit(&mut cx) else {
        panic!("a ready service finishes on the first poll");
    };
    assert_eq!(editor.layers()[1].id, id);
    assert_eq!(editor.layers()[1].name, "x");
    assert!(!editor.is_ai_loading());
}
