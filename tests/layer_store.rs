use eframe_photo::command::Command;
use eframe_photo::layer::TextLayer;
use eframe_photo::{Direction, Document, Editor, EditorConfig, ImageFile, Layer, MemoryStorage};
use eframe_photo::LayerId;
use egui::{Color32, Key, Modifiers, Pos2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn text_layer(name: &str) -> Layer {
    Layer::new_text(
        name,
        TextLayer {
            text: name.to_owned(),
            font_size: 24.0,
            color: Color32::WHITE,
            position: Pos2::new(0.0, 24.0),
        },
    )
}

fn names(document: &Document) -> Vec<&str> {
    document.layers().iter().map(|l| l.name.as_str()).collect()
}

fn stack_of(names: &[&str]) -> Document {
    let mut document = Document::new();
    for name in names {
        document.add_layer(text_layer(name));
    }
    document
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 0, 0, 255]));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

#[test]
fn adding_keeps_active_layer() {
    let mut document = stack_of(&["a"]);
    let first = document.layers()[0].id;
    document.set_active(Some(first));

    document.add_layer(text_layer("b"));
    assert_eq!(names(&document), ["a", "b"]);
    assert_eq!(document.active_layer_id(), Some(first));
}

#[test]
fn deleting_active_selects_successor_then_predecessor() {
    let mut document = stack_of(&["a", "b", "c"]);
    let ids: Vec<_> = document.layers().iter().map(|l| l.id).collect();

    document.set_active(Some(ids[1]));
    document.delete_layer(ids[1]);
    assert_eq!(names(&document), ["a", "c"]);
    assert_eq!(document.active_layer_id(), Some(ids[2]));

    document.delete_layer(ids[2]);
    assert_eq!(document.active_layer_id(), Some(ids[0]));

    document.delete_layer(ids[0]);
    assert!(document.is_empty());
    assert_eq!(document.active_layer_id(), None);
}

#[test]
fn deleting_inactive_layer_keeps_active() {
    let mut document = stack_of(&["a", "b"]);
    let ids: Vec<_> = document.layers().iter().map(|l| l.id).collect();
    document.set_active(Some(ids[1]));
    document.delete_layer(ids[0]);
    assert_eq!(document.active_layer_id(), Some(ids[1]));
}

#[test]
fn duplicate_lands_above_original_and_becomes_active() {
    let mut document = stack_of(&["a", "b"]);
    let original = document.layers()[0].id;

    let copy = document.duplicate_layer(original).unwrap();
    assert_eq!(names(&document), ["a", "a Copy", "b"]);
    assert_eq!(document.active_layer_id(), Some(copy));
    assert_ne!(copy, original);
    assert_eq!(document.layers()[1].kind, document.layers()[0].kind);
}

#[test]
fn reorder_is_noop_at_boundaries() {
    let mut document = stack_of(&["a", "b", "c"]);
    let top = document.layers()[2].id;
    let bottom = document.layers()[0].id;

    document.reorder(top, Direction::Up);
    document.reorder(bottom, Direction::Down);
    assert_eq!(names(&document), ["a", "b", "c"]);

    document.reorder(bottom, Direction::Up);
    assert_eq!(names(&document), ["b", "a", "c"]);
    document.reorder(top, Direction::Down);
    assert_eq!(names(&document), ["b", "c", "a"]);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut document = stack_of(&["a"]);
    let stranger = text_layer("x").id;
    document.delete_layer(stranger);
    document.toggle_visibility(stranger);
    document.reorder(stranger, Direction::Up);
    assert!(document.duplicate_layer(stranger).is_none());
    assert_eq!(names(&document), ["a"]);
}

#[test]
fn editor_shortcuts_duplicate_and_delete_active() {
    let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
    editor
        .load_image(ImageFile::new("bg.png", "image/png", png(20, 20)))
        .unwrap();

    editor.handle_input(eframe_photo::InputEvent::KeyDown {
        key: Key::D,
        modifiers: Modifiers::COMMAND,
        repeat: false,
    });
    assert_eq!(names(editor.document()), ["Background", "Background Copy"]);
    let copy = editor.layers()[1].id;
    assert_eq!(editor.document().active_layer_id(), Some(copy));

    editor.handle_input(eframe_photo::InputEvent::KeyDown {
        key: Key::Delete,
        modifiers: Modifiers::NONE,
        repeat: false,
    });
    assert_eq!(names(editor.document()), ["Background"]);
    assert_eq!(editor.document().active_layer_id(), Some(editor.layers()[0].id));
}

#[test]
fn toggling_visibility_through_commands() {
    let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
    editor
        .load_image(ImageFile::new("bg.png", "image/png", png(20, 20)))
        .unwrap();
    let id = editor.layers()[0].id;

    editor.execute(Command::ToggleVisibility(id)).unwrap();
    assert!(!editor.layers()[0].visible);
    assert!(editor.surface().unwrap().pixels().iter().all(|p| p.alpha() == 0));

    editor.execute(Command::ToggleVisibility(id)).unwrap();
    assert!(editor.layers()[0].visible);
    assert_eq!(editor.surface().unwrap().pixel(5, 5).unwrap().red(), 200);
}

#[test]
fn renaming_keeps_position() {
    let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
    editor
        .load_image(ImageFile::new("bg.png", "image/png", png(20, 20)))
        .unwrap();
    editor.execute(Command::AddTextLayer).unwrap();
    let id = editor.layers()[0].id;

    editor
        .execute(Command::RenameLayer {
            layer_id: id,
            name: "Base".into(),
        })
        .unwrap();
    assert_eq!(names(editor.document()), ["Base", "Hello World"]);
}

fn ids(document: &Document) -> Vec<LayerId> {
    document.layers().iter().map(|l| l.id).collect()
}

/// Drives the store with a long seeded sequence of adds, deletes and moves
/// and compares it with a plain list after every step.
#[test]
fn random_mutations_match_a_plain_list() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut document = Document::new();
        let mut expected: Vec<LayerId> = Vec::new();
        let (mut added, mut deleted) = (0usize, 0usize);

        for step in 0..400 {
            let before = expected.clone();
            let mut touched = None;

            match rng.gen_range(0..10) {
                0..=3 => {
                    let layer = text_layer(&format!("layer {step}"));
                    touched = Some(layer.id);
                    expected.push(layer.id);
                    document.add_layer(layer);
                    added += 1;
                }
                4..=6 if !expected.is_empty() => {
                    let id = expected.remove(rng.gen_range(0..expected.len()));
                    touched = Some(id);
                    if rng.gen_bool(0.5) {
                        document.set_active(Some(id));
                    }
                    document.delete_layer(id);
                    deleted += 1;
                }
                7..=8 if !expected.is_empty() => {
                    let index = rng.gen_range(0..expected.len());
                    let id = expected[index];
                    let (direction, target) = if rng.gen_bool(0.5) {
                        (Direction::Up, index + 1)
                    } else {
                        (Direction::Down, index.wrapping_sub(1))
                    };
                    if target < expected.len() {
                        expected.swap(index, target);
                        touched = Some(id);
                    }
                    document.reorder(id, direction);
                }
                _ => {
                    // unknown ids are ignored
                    document.delete_layer(LayerId::new());
                    document.reorder(LayerId::new(), Direction::Up);
                }
            }

            let actual = ids(&document);
            assert_eq!(actual, expected, "seed {seed} step {step}");
            assert_eq!(actual.len(), added - deleted);

            let untouched: Vec<LayerId> = before
                .iter()
                .copied()
                .filter(|id| Some(*id) != touched && actual.contains(id))
                .collect();
            let still_ordered: Vec<LayerId> = actual
                .iter()
                .copied()
                .filter(|id| untouched.contains(id))
                .collect();
            assert_eq!(still_ordered, untouched, "seed {seed} step {step}");

            if let Some(active) = document.active_layer_id() {
                assert!(actual.contains(&active));
            }
        }
    }
}
