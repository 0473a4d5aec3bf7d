use serde_json::Value;

use crate::routes::Route;

/// Follow-up the server asks the client to perform after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    OpenWorksheet(String),
    OpenBundle(String),
    SetEditMode(bool),
    Upload,
}

/// Side effects the terminal can trigger outside itself.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
    fn open_new_tab(&mut self, route: Route);
    fn set_edit_mode(&mut self, on: bool);
    fn open_upload(&mut self);
}

fn parse_ui_action(raw: &Value) -> Option<UiAction> {
    let pair = raw.as_array()?;
    let name = pair.first()?.as_str()?;
    let param = pair.get(1).unwrap_or(&Value::Null);
    match name {
        "openWorksheet" => param.as_str().map(|u| UiAction::OpenWorksheet(u.to_string())),
        "openBundle" => param.as_str().map(|u| UiAction::OpenBundle(u.to_string())),
        "setEditMode" => param.as_bool().map(UiAction::SetEditMode),
        "upload" => Some(UiAction::Upload),
        _ => None,
    }
}

/// Parses `[name, param]` pairs. Unknown or malformed actions are logged and
/// skipped.
pub fn parse_ui_actions(raw: &[Value]) -> Vec<UiAction> {
    raw.iter()
        .filter_map(|v| {
            let action = parse_ui_action(v);
            if action.is_none() {
                tracing::warn!(action = %v, "ignoring unknown ui action");
            }
            action
        })
        .collect()
}

pub fn dispatch<N: Navigator + ?Sized>(actions: &[UiAction], nav: &mut N) {
    for action in actions {
        tracing::info!(?action, "ui action");
        match action {
            UiAction::OpenWorksheet(uuid) => nav.navigate(Route::Worksheet(uuid.clone())),
            UiAction::OpenBundle(uuid) => nav.open_new_tab(Route::Bundle(uuid.clone())),
            UiAction::SetEditMode(on) => nav.set_edit_mode(*on),
            UiAction::Upload => nav.open_upload(),
        }
    }
}
