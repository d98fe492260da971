//! Control panel overlay.
//!
//! [`draw`] renders the egui widgets from a read-only view of the simulation
//! and returns the [`Action`]s the user triggered. [`UiState::handle`] is the
//! single place actions are carried out: simulation commands go through
//! [`SimulationContext::apply`], everything else changes panel state.
//! Keyboard shortcuts map onto the same actions via [`shortcut`].

use egui::{Align2, Color32, CursorIcon, RichText, Sense};
use tracing::debug;

use crate::config::Theme;
use crate::controls::{
    body_speed_to_slider, global_speed_to_slider, slider_to_body_speed, slider_to_global_speed,
    Command, SpeedMode, NOTIFICATION_SECONDS,
};
use crate::input::KeyCode;
use crate::selection::BodyDetails;
use crate::simulation::SimulationContext;

pub const DEFAULT_PANEL_HEIGHT: f32 = 300.0;
pub const COLLAPSED_PANEL_HEIGHT: f32 = 50.0;
/// The panel must stay taller than this while resizing.
pub const MIN_PANEL_HEIGHT: f32 = 100.0;
/// The panel must stay below this fraction of the viewport while resizing.
pub const MAX_PANEL_FRACTION: f32 = 0.7;

const ABOUT_TEXT: &str = "An animated model of the solar system. Drag to orbit the camera, \
scroll to zoom and click a planet or the sun for details. Speeds are not to scale.";

const SHORTCUTS: [(&str, &str); 6] = [
    ("Space", "Pause / resume"),
    ("R", "Reset speeds"),
    ("1 / 2 / 3", "0.5x / 1x / 2x"),
    ("T", "Toggle theme"),
    ("H", "Hide / show panel"),
    ("Esc", "Close details"),
];

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Sim(Command),
    ToggleTheme,
    TogglePanel,
    /// Proposed panel height in points.
    ResizePanel(f32),
    ToggleInfo,
    CloseInfo,
}

/// Map a key press to its action.
pub fn shortcut(key: KeyCode) -> Option<Action> {
    Some(match key {
        KeyCode::Space => Action::Sim(Command::TogglePause),
        KeyCode::R => Action::Sim(Command::ResetAll),
        KeyCode::Key1 => Action::Sim(Command::SetSpeedMode(SpeedMode::Slow)),
        KeyCode::Key2 => Action::Sim(Command::SetSpeedMode(SpeedMode::Normal)),
        KeyCode::Key3 => Action::Sim(Command::SetSpeedMode(SpeedMode::Fast)),
        KeyCode::T => Action::ToggleTheme,
        KeyCode::H => Action::TogglePanel,
        KeyCode::Escape => Action::Sim(Command::ClearSelection),
        KeyCode::Other(_) => return None,
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Notification {
    message: String,
    remaining: f32,
}

/// Presentation state that is not part of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    theme: Theme,
    panel_hidden: bool,
    panel_height: f32,
    viewport_height: f32,
    info_open: bool,
    notification: Option<Notification>,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            panel_hidden: false,
            panel_height: DEFAULT_PANEL_HEIGHT,
            viewport_height: 720.0,
            info_open: false,
            notification: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_panel_hidden(&self) -> bool {
        self.panel_hidden
    }

    /// Height the panel is drawn at: its expanded height, or the collapsed
    /// strip while hidden.
    pub fn panel_height(&self) -> f32 {
        if self.panel_hidden {
            COLLAPSED_PANEL_HEIGHT
        } else {
            self.panel_height
        }
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    pub fn is_info_open(&self) -> bool {
        self.info_open
    }

    /// Current toast text, if one is showing.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.message.as_str())
    }

    /// Show a toast, replacing any current one.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            remaining: NOTIFICATION_SECONDS,
        });
    }

    /// Count down the toast by `delta` seconds.
    pub fn update(&mut self, delta: f32) {
        if let Some(notification) = &mut self.notification {
            notification.remaining -= delta.max(0.0);
            if notification.remaining <= 0.0 {
                self.notification = None;
            }
        }
    }

    /// Resize the expanded panel. Heights not strictly between the minimum
    /// and 70% of the viewport are ignored. Returns whether it applied.
    pub fn resize_panel(&mut self, height: f32) -> bool {
        let max = self.viewport_height * MAX_PANEL_FRACTION;
        if self.panel_hidden || !(height > MIN_PANEL_HEIGHT && height < max) {
            return false;
        }
        self.panel_height = height;
        true
    }

    /// Carry out an action.
    pub fn handle(&mut self, sim: &mut SimulationContext, action: Action) {
        debug!(?action, "ui action");
        match action {
            Action::Sim(command) => {
                if let Some(message) = sim.apply(command) {
                    self.notify(message);
                }
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
            }
            Action::TogglePanel => {
                self.panel_hidden = !self.panel_hidden;
                self.notify(if self.panel_hidden {
                    "Control panel hidden. Click + to show."
                } else {
                    "Control panel visible"
                });
            }
            Action::ResizePanel(height) => {
                self.resize_panel(height);
            }
            Action::ToggleInfo => self.info_open = !self.info_open,
            Action::CloseInfo => self.info_open = false,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

fn color32(color: u32) -> Color32 {
    Color32::from_rgb((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Draw the whole overlay for one frame.
pub fn draw(ctx: &egui::Context, sim: &SimulationContext, state: &UiState) -> Vec<Action> {
    let mut actions = Vec::new();

    draw_toolbar(ctx, state, &mut actions);
    draw_control_panel(ctx, sim, state, &mut actions);
    draw_details(ctx, sim, &mut actions);
    if state.info_open {
        draw_info(ctx, &mut actions);
    }
    if let Some(message) = state.notification() {
        draw_notification(ctx, message);
    }

    actions
}

fn draw_toolbar(ctx: &egui::Context, state: &UiState, actions: &mut Vec<Action>) {
    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(Align2::RIGHT_TOP, [-12.0, 12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_icon = match state.theme {
                    Theme::Dark => "🌙",
                    Theme::Light => "☀",
                };
                if ui.button(theme_icon).on_hover_text("Toggle theme (T)").clicked() {
                    actions.push(Action::ToggleTheme);
                }
                if ui.button("ℹ").on_hover_text("About").clicked() {
                    actions.push(Action::ToggleInfo);
                }
            });
        });
}

fn draw_control_panel(
    ctx: &egui::Context,
    sim: &SimulationContext,
    state: &UiState,
    actions: &mut Vec<Action>,
) {
    egui::TopBottomPanel::bottom("speed_controls")
        .exact_height(state.panel_height())
        .show(ctx, |ui| {
            if !state.panel_hidden {
                let (_, handle) = ui.allocate_exact_size(
                    egui::vec2(ui.available_width(), 6.0),
                    Sense::drag(),
                );
                let handle = handle.on_hover_cursor(CursorIcon::ResizeVertical);
                if handle.dragged() && handle.drag_delta().y != 0.0 {
                    actions.push(Action::ResizePanel(state.panel_height - handle.drag_delta().y));
                }
            }

            ui.horizontal(|ui| {
                ui.heading("Orbital Controls");
                ui.separator();

                let mode = sim.speed_mode();
                ui.label(mode.time_display());
                for preset in SpeedMode::PRESETS {
                    if ui.selectable_label(mode == preset, preset.label()).clicked() {
                        actions.push(Action::Sim(Command::SetSpeedMode(preset)));
                    }
                }
                ui.separator();

                let pause_label = if sim.is_paused() { "▶ Resume" } else { "⏸ Pause" };
                if ui.button(pause_label).clicked() {
                    actions.push(Action::Sim(Command::TogglePause));
                }
                if ui.button("⟲ Reset").clicked() {
                    actions.push(Action::Sim(Command::ResetAll));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let hide_label = if state.panel_hidden { "+" } else { "−" };
                    if ui.button(hide_label).on_hover_text("Hide / show (H)").clicked() {
                        actions.push(Action::TogglePanel);
                    }
                });
            });

            if state.panel_hidden {
                return;
            }

            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("speed_grid")
                    .num_columns(3)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Global Speed").strong());
                        let global_speed = sim.clock().global_speed();
                        let mut value = global_speed_to_slider(global_speed).round();
                        let slider = egui::Slider::new(&mut value, 1.0..=20.0)
                            .step_by(1.0)
                            .show_value(false);
                        if ui.add(slider).changed() {
                            actions.push(Action::Sim(Command::SetGlobalSpeed(
                                slider_to_global_speed(value),
                            )));
                        }
                        ui.label(format!("{:.1}x", global_speed));
                        ui.end_row();

                        for (id, descriptor) in sim.registry().planets() {
                            let Some(body) = sim.body(id) else { continue };

                            ui.horizontal(|ui| {
                                let (rect, _) =
                                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                                ui.painter().rect_filled(rect, 6.0, color32(descriptor.color));
                                ui.label(descriptor.name.as_str());
                            });

                            let mut value = body_speed_to_slider(body.speed);
                            let slider = egui::Slider::new(&mut value, 0.0..=200.0)
                                .step_by(1.0)
                                .show_value(false);
                            if ui.add(slider).changed() {
                                actions.push(Action::Sim(Command::SetBodySpeed {
                                    body: id,
                                    speed: slider_to_body_speed(value),
                                }));
                            }
                            ui.label(format!("{:.1}", value));
                            ui.end_row();
                        }
                    });
            });
        });
}

fn draw_details(ctx: &egui::Context, sim: &SimulationContext, actions: &mut Vec<Action>) {
    let Some(details) = BodyDetails::for_selection(sim) else {
        return;
    };

    let mut open = true;
    egui::Window::new(RichText::new(details.name.as_str()).heading())
        .id(egui::Id::new("body_details"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            ui.label(details.info.as_str());
            ui.add_space(6.0);
            egui::Grid::new("body_stats").num_columns(2).show(ui, |ui| {
                for (label, value) in [
                    ("Scale", &details.scale),
                    ("Distance from Sun", &details.distance),
                    ("Orbital Period", &details.orbital_period),
                    ("Rotation", &details.rotation_period),
                ] {
                    ui.label(RichText::new(label).weak());
                    ui.label(value.as_str());
                    ui.end_row();
                }
            });
            if !details.notes.is_empty() {
                ui.add_space(6.0);
                for note in &details.notes {
                    ui.label(format!("• {}", note));
                }
            }
        });

    if !open {
        actions.push(Action::Sim(Command::ClearSelection));
    }
}

fn draw_info(ctx: &egui::Context, actions: &mut Vec<Action>) {
    let mut open = true;
    egui::Window::new("About")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::RIGHT_TOP, [-12.0, 48.0])
        .show(ctx, |ui| {
            ui.label(ABOUT_TEXT);
            ui.add_space(6.0);
            egui::Grid::new("shortcuts").num_columns(2).show(ui, |ui| {
                for (key, what) in SHORTCUTS {
                    ui.label(RichText::new(key).monospace());
                    ui.label(what);
                    ui.end_row();
                }
            });
        });
    if !open {
        actions.push(Action::CloseInfo);
    }
}

fn draw_notification(ctx: &egui::Context, message: &str) {
    egui::Area::new(egui::Id::new("notification"))
        .anchor(Align2::CENTER_TOP, [0.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(message);
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Registry;
    use crate::config::SimulationSettings;

    fn sim() -> SimulationContext {
        let settings = SimulationSettings {
            randomize_angles: false,
            ..SimulationSettings::default()
        };
        SimulationContext::new(Registry::solar_system(), settings)
    }

    #[test]
    fn test_notifications_expire_after_three_seconds() {
        let mut state = UiState::default();
        state.notify("hello");
        state.update(2.9);
        assert_eq!(state.notification(), Some("hello"));
        state.update(0.2);
        assert_eq!(state.notification(), None);
    }

    #[test]
    fn test_pause_action_notifies() {
        let mut sim = sim();
        let mut state = UiState::default();

        state.handle(&mut sim, Action::Sim(Command::TogglePause));
        assert!(sim.is_paused());
        assert_eq!(state.notification(), Some("Animation paused"));

        state.handle(&mut sim, Action::Sim(Command::TogglePause));
        assert_eq!(state.notification(), Some("Animation resumed"));
    }

    #[test]
    fn test_panel_toggle() {
        let mut sim = sim();
        let mut state = UiState::default();

        state.handle(&mut sim, Action::TogglePanel);
        assert!(state.is_panel_hidden());
        assert_eq!(state.panel_height(), COLLAPSED_PANEL_HEIGHT);
        assert_eq!(state.notification(), Some("Control panel hidden. Click + to show."));

        state.handle(&mut sim, Action::TogglePanel);
        assert_eq!(state.panel_height(), DEFAULT_PANEL_HEIGHT);
        assert_eq!(state.notification(), Some("Control panel visible"));
    }

    #[test]
    fn test_panel_resize_bounds() {
        let mut state = UiState::default();
        state.set_viewport_height(1000.0);

        assert!(state.resize_panel(400.0));
        assert_eq!(state.panel_height(), 400.0);

        assert!(!state.resize_panel(100.0));
        assert!(!state.resize_panel(700.0));
        assert!(!state.resize_panel(f32::NAN));
        assert_eq!(state.panel_height(), 400.0);

        assert!(state.resize_panel(699.0));
    }

    #[test]
    fn test_theme_and_info() {
        let mut sim = sim();
        let mut state = UiState::new(Theme::Dark);

        state.handle(&mut sim, Action::ToggleTheme);
        assert_eq!(state.theme(), Theme::Light);

        state.handle(&mut sim, Action::ToggleInfo);
        assert!(state.is_info_open());
        state.handle(&mut sim, Action::CloseInfo);
        assert!(!state.is_info_open());
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(shortcut(KeyCode::Space), Some(Action::Sim(Command::TogglePause)));
        assert_eq!(
            shortcut(KeyCode::Key3),
            Some(Action::Sim(Command::SetSpeedMode(SpeedMode::Fast)))
        );
        assert_eq!(shortcut(KeyCode::Escape), Some(Action::Sim(Command::ClearSelection)));
        assert_eq!(shortcut(KeyCode::Other(0)), None);
    }

    #[test]
    fn test_draw_headless() {
        let mut sim = sim();
        let earth = sim.registry().find("earth").unwrap();
        sim.select(Some(earth));

        let mut state = UiState::default();
        state.notify("Animation paused");
        state.handle(&mut sim, Action::ToggleInfo);

        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw(ctx, &sim, &state);
        });
        assert!(actions.is_empty());
    }
}
