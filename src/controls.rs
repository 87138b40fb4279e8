//! The demo's control panel.
//!
//! [`Controls`] is plain data; [`Controls::show`] draws it with egui and writes
//! slider edits straight back into the struct. Keeping the state separate from
//! the widgets means the reset rules can be tested without a window.

use std::ops::RangeInclusive;

use glam::{Quat, Vec3};

use crate::rotation::RotationMode;

pub const POSITION_RANGE: RangeInclusive<f32> = -10.0..=10.0;
pub const ROTATION_RANGE: RangeInclusive<f32> = -180.0..=180.0;
pub const SCALE_RANGE: RangeInclusive<f32> = 1.0..=8.0;
pub const LIGHT_SPEED_RANGE: RangeInclusive<f32> = 0.2..=2.0;
pub const LIGHT_HEIGHT_RANGE: RangeInclusive<f32> = -2.0..=5.0;

const PANEL_WIDTH: f32 = 150.0;

/// Placement of the box being manipulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxState {
    pub position: Vec3,
    /// Raw slider components. Not necessarily unit length.
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for BoxState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            scale: 1.0,
        }
    }
}

/// Everything the panel edits.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub box_state: BoxState,
    pub light_speed: f32,
    pub light_height: f32,
    pub draw_faces: bool,
    pub mode: RotationMode,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            box_state: BoxState::default(),
            light_speed: 2.0,
            light_height: 4.0,
            draw_faces: false,
            mode: RotationMode::ZyxEuler,
        }
    }
}

impl Controls {
    /// Panel defaults: box at the origin, zero rotation, light speed 2, height 4.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores placement and light settings. The rotation mode and the faces
    /// checkbox are left as they are.
    pub fn reset(&mut self) {
        let defaults = Self::default();
        self.box_state = defaults.box_state;
        self.light_speed = defaults.light_speed;
        self.light_height = defaults.light_height;
    }

    /// Draws the FPS counter, the mode dropdown and the settings window.
    pub fn show(&mut self, ctx: &egui::Context, fps: f32) {
        egui::Area::new(egui::Id::new("fps_counter"))
            .fixed_pos(egui::pos2(4.0, 4.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.colored_label(egui::Color32::LIGHT_GREEN, format!("{fps:.0} FPS"));
            });

        egui::Area::new(egui::Id::new("rotation_mode"))
            .fixed_pos(egui::pos2(20.0, 40.0))
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Rotation Mode").size(19.0).color(egui::Color32::from_gray(245)));
                egui::ComboBox::from_id_salt("rotation_mode_dropdown")
                    .width(140.0)
                    .selected_text(self.mode.label())
                    .show_ui(ui, |ui| {
                        for mode in RotationMode::ALL {
                            ui.selectable_value(&mut self.mode, mode, mode.label());
                        }
                    });
            });

        egui::Window::new("Settings")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 20.0])
            .resizable(false)
            .collapsible(false)
            .default_width(PANEL_WIDTH)
            .show(ctx, |ui| self.settings_ui(ui));
    }

    fn settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.checkbox(&mut self.draw_faces, "Draw Faces & Texture");
        ui.separator();

        let b = &mut self.box_state;
        slider(ui, "PosX", &mut b.position.x, POSITION_RANGE);
        slider(ui, "PosY", &mut b.position.y, POSITION_RANGE);
        slider(ui, "PosZ", &mut b.position.z, POSITION_RANGE);

        if self.mode.uses_w() {
            slider(ui, "RotW", &mut b.rotation.w, ROTATION_RANGE);
        }
        slider(ui, "RotX", &mut b.rotation.x, ROTATION_RANGE);
        slider(ui, "RotY", &mut b.rotation.y, ROTATION_RANGE);
        slider(ui, "RotZ", &mut b.rotation.z, ROTATION_RANGE);

        slider(ui, "Scale", &mut b.scale, SCALE_RANGE);
        slider(ui, "LSpeed", &mut self.light_speed, LIGHT_SPEED_RANGE);
        slider(ui, "LHeight", &mut self.light_height, LIGHT_HEIGHT_RANGE);

        ui.add_space(6.0);
        if ui.button("RESET").clicked() {
            log::debug!("controls reset");
            self.reset();
        }
    }
}

fn slider(ui: &mut egui::Ui, label: &str, value: &mut f32, range: RangeInclusive<f32>) {
    ui.add(egui::Slider::new(value, range).text(label).fixed_decimals(2));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_state() {
        let c = Controls::new();
        assert_eq!(c.box_state.position, Vec3::ZERO);
        assert_eq!(c.box_state.rotation, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(c.box_state.scale, 1.0);
        assert_eq!(c.light_speed, 2.0);
        assert_eq!(c.light_height, 4.0);
        assert!(!c.draw_faces);
        assert_eq!(c.mode, RotationMode::ZyxEuler);
    }

    #[test]
    fn reset_restores_placement_and_light() {
        let mut c = Controls::new();
        c.box_state.position = Vec3::new(3.0, -2.0, 7.5);
        c.box_state.rotation = Quat::from_xyzw(10.0, 20.0, 30.0, 40.0);
        c.box_state.scale = 6.0;
        c.light_speed = 0.4;
        c.light_height = -1.5;

        c.reset();

        assert_eq!(c.box_state, BoxState::default());
        assert_eq!(c.light_speed, 2.0);
        assert_eq!(c.light_height, 4.0);
    }

    #[test]
    fn reset_keeps_mode_and_checkbox() {
        let mut c = Controls::new();
        c.mode = RotationMode::AxisAngle;
        c.draw_faces = true;
        c.box_state.scale = 3.0;

        c.reset();

        assert_eq!(c.mode, RotationMode::AxisAngle);
        assert!(c.draw_faces);
        assert_eq!(c.box_state.scale, 1.0);
    }

    #[test]
    fn defaults_sit_inside_slider_ranges() {
        let c = Controls::new();
        assert!(POSITION_RANGE.contains(&c.box_state.position.x));
        assert!(ROTATION_RANGE.contains(&c.box_state.rotation.w));
        assert!(SCALE_RANGE.contains(&c.box_state.scale));
        assert!(LIGHT_SPEED_RANGE.contains(&c.light_speed));
        assert!(LIGHT_HEIGHT_RANGE.contains(&c.light_height));
    }

    fn collect_text(shape: &egui::Shape, out: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(text) => out.push(text.galley.text().to_owned()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_text(s, out)),
            _ => {}
        }
    }

    #[test]
    fn panel_draws_every_widget_headless() {
        let ctx = egui::Context::default();
        let mut c = Controls::new();
        c.mode = RotationMode::Quaternion;

        // The first frame only measures windows; the second paints them.
        let _ = ctx.run(egui::RawInput::default(), |ctx| c.show(ctx, 120.0));
        let output = ctx.run(egui::RawInput::default(), |ctx| c.show(ctx, 120.0));

        assert!(!output.shapes.is_empty());
        for area in ["Settings", "rotation_mode", "fps_counter"] {
            assert!(ctx.memory(|m| m.area_rect(egui::Id::new(area))).is_some(), "{area}");
        }

        let mut text = Vec::new();
        for clipped in &output.shapes {
            collect_text(&clipped.shape, &mut text);
        }
        for label in [
            "Rotation Mode",
            "Quaternion",
            "Draw Faces & Texture",
            "PosX",
            "RotW",
            "Scale",
            "LSpeed",
            "LHeight",
            "RESET",
            "120 FPS",
        ] {
            assert!(text.iter().any(|t| t == label), "missing {label:?} in {text:?}");
        }

        // Drawing alone never edits the state.
        let mut expected = Controls::new();
        expected.mode = RotationMode::Quaternion;
        assert_eq!(c, expected);
    }

    #[test]
    fn euler_panel_hides_w_slider() {
        let ctx = egui::Context::default();
        let mut c = Controls::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| c.show(ctx, 60.0));
        let output = ctx.run(egui::RawInput::default(), |ctx| c.show(ctx, 60.0));

        let mut text = Vec::new();
        for clipped in &output.shapes {
            collect_text(&clipped.shape, &mut text);
        }
        assert!(text.iter().any(|t| t == "RotX"));
        assert!(!text.iter().any(|t| t == "RotW"));
    }
}
