//! ImGui rendering of the editor panels
//!
//! The parameter panel is drawn from [`Editor::panel`]: folders become tree
//! nodes and each control becomes the widget for its [`ControlKind`]. Edits
//! go back through [`Editor::apply_edit`] and [`Editor::apply_action`], so
//! the UI holds no state of its own.

use imgui::{Condition, StyleColor};

use crate::config::UiConfig;
use crate::editor::{Editor, Folder, NavAction, PanelItem, PanelTarget};
use crate::gfx::color::Rgb;
use crate::ui::reflect::{Control, ControlKind, ParamValue};

/// Draws the navigation toolbar and the parameter panel.
pub fn editor_panels(ui: &imgui::Ui, editor: &mut Editor, config: &UiConfig) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    nav_toolbar(ui, editor);
    parameter_panel(ui, editor, config, display_size);
}

fn nav_toolbar(ui: &imgui::Ui, editor: &mut Editor) {
    ui.window("Navigation")
        .position([10.0, 10.0], Condition::FirstUseEver)
        .title_bar(false)
        .resizable(false)
        .always_auto_resize(true)
        .build(|| {
            for (i, action) in NavAction::ALL.into_iter().enumerate() {
                if i > 0 {
                    ui.same_line();
                }
                let [r, g, b] = editor.nav_color(action).to_srgb();
                let _button = ui.push_style_color(StyleColor::Button, [r, g, b, 1.0]);
                let _text = ui.push_style_color(StyleColor::Text, [0.0, 0.0, 0.0, 1.0]);
                if ui.button(action.label()) {
                    editor.apply_nav(action);
                }
            }
        });
}

fn parameter_panel(ui: &imgui::Ui, editor: &mut Editor, config: &UiConfig, display_size: [f32; 2]) {
    let width = config.panel_width.min(display_size[0]);

    ui.window("Parameters")
        .position([display_size[0] - width - 10.0, 10.0], Condition::FirstUseEver)
        .size([width, display_size[1] * 0.9], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            for folder in editor.panel() {
                render_folder(ui, editor, &folder);
            }
        });
}

fn render_folder(ui: &imgui::Ui, editor: &mut Editor, folder: &Folder) {
    let _id = ui.push_id(folder.title.as_str());
    let Some(_node) = ui.tree_node(folder.title.as_str()) else {
        return;
    };

    for item in &folder.items {
        match item {
            PanelItem::Folder(child) => render_folder(ui, editor, child),
            PanelItem::Control(control) => {
                if let Some(target) = folder.target {
                    render_control(ui, editor, target, control);
                }
            }
        }
    }
}

fn render_control(ui: &imgui::Ui, editor: &mut Editor, target: PanelTarget, control: &Control) {
    if control.kind == ControlKind::Action {
        if ui.button(control.label) {
            editor.apply_action(target, control.key);
        }
        return;
    }

    let Some(value) = editor.param(target, control.key) else {
        return;
    };
    if let Some(edited) = edit_value(ui, control, value) {
        editor.apply_edit(target, control.key, edited);
    }
}

/// The widget for one value. Returns the new value when it was edited.
fn edit_value(ui: &imgui::Ui, control: &Control, value: ParamValue) -> Option<ParamValue> {
    let label = control.label;
    match (control.kind, value) {
        (ControlKind::Slider(min, max, _), ParamValue::Float(mut v)) => {
            ui.slider(label, min, max, &mut v).then(|| ParamValue::Float(v))
        }
        (ControlKind::Drag(speed), ParamValue::Float(mut v)) => imgui::Drag::new(label)
            .speed(speed)
            .build(ui, &mut v)
            .then(|| ParamValue::Float(v)),
        (ControlKind::Int(min, max), ParamValue::Int(mut v)) => {
            ui.slider(label, min, max, &mut v).then(|| ParamValue::Int(v))
        }
        (ControlKind::Toggle, ParamValue::Bool(mut v)) => ui.checkbox(label, &mut v).then(|| ParamValue::Bool(v)),
        (ControlKind::Color, ParamValue::Color(rgb)) => {
            let mut color = rgb.to_srgb();
            ui.color_edit3(label, &mut color)
                .then(|| ParamValue::Color(Rgb::from_srgb(color)))
        }
        (ControlKind::Choice(options), ParamValue::Choice(mut i)) => {
            ui.combo_simple_string(label, &mut i, options).then(|| ParamValue::Choice(i))
        }
        // a value that does not fit its control is shown read-only
        (_, other) => {
            ui.text_disabled(format!("{label}: {other:?}"));
            None
        }
    }
}
