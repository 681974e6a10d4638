mod central_panel;
mod layers_panel;
mod tools_panel;
mod top_bar;

pub use central_panel::central_panel;
pub use layers_panel::layers_panel;
pub use tools_panel::{options_panel, tools_panel};
pub use top_bar::{new_project_dialog, top_bar};
