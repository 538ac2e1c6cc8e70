//! Interactive surface console
//!
//! A REPL standing in for the physical hardware: buttons are pressed and
//! released by typing, pads play notes, and the window grid renders to the
//! terminal. Everything flows through the same classifier -> command ->
//! bank -> observer path a real surface would use, so the console doubles as
//! an end-to-end exerciser during development.

use crate::bank::BankWindow;
use crate::button::{arm_long_press, Button, ButtonClassifier, ButtonEvent};
use crate::command::FunctionCommand;
use crate::config::SurfaceSettings;
use crate::feedback::{self, FunctionLed, PadLed};
use crate::model::sim::SimModel;
use crate::model::{Color, ModelProvider, SceneBank};
use crate::session::{SessionState, TrackFunction};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// What the event loop should do after a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Continue,
    Quit,
}

/// JSON-serializable snapshot for the `state` command.
#[derive(Serialize)]
struct StateSnapshot<'a> {
    session: &'a SessionState,
    scene_position: isize,
    selected_track: Option<usize>,
    any_clip_recording: bool,
}

/// The simulated surface: model, bank window, classifier, session, and the
/// two function commands, wired together.
pub struct SurfaceConsole {
    model: Arc<SimModel>,
    bank: Arc<BankWindow>,
    classifier: Arc<ButtonClassifier>,
    session: SessionState,
    mute: FunctionCommand,
    solo: FunctionCommand,
    long_press_tx: mpsc::UnboundedSender<(Button, ButtonEvent)>,
}

impl SurfaceConsole {
    /// Wire a full surface over a demo model.
    ///
    /// `long_press_tx` is where armed long-press timers deliver their LONG
    /// events; the event loop feeds them back via
    /// [`handle_button_event`](Self::handle_button_event).
    pub fn new(
        settings: &SurfaceSettings,
        long_press_tx: mpsc::UnboundedSender<(Button, ButtonEvent)>,
    ) -> Result<Self> {
        let model = Arc::new(SimModel::demo(
            settings.bank.num_tracks,
            settings.bank.num_scenes,
        ));
        let scene_bank: Option<Arc<dyn SceneBank>> = if settings.bank.scene_section {
            Some(Arc::new(model.scene_bank()))
        } else {
            None
        };
        let bank = Arc::new(BankWindow::new(
            model.clone() as Arc<dyn ModelProvider>,
            scene_bank,
            settings.bank.num_tracks,
            settings.bank.num_scenes,
            settings.bank.num_sends,
        ));
        bank.refresh()?;

        bank.add_selection_observer(|event| {
            info!(
                "selection: track {} {}",
                event.track,
                if event.selected { "selected" } else { "deselected" }
            );
            Ok(())
        });

        let classifier = Arc::new(ButtonClassifier::new(Duration::from_millis(
            settings.buttons.long_press_ms,
        )));

        let mute = FunctionCommand::new(
            TrackFunction::Mute,
            bank.clone(),
            model.clone() as Arc<dyn ModelProvider>,
        );
        let solo = FunctionCommand::new(
            TrackFunction::Solo,
            bank.clone(),
            model.clone() as Arc<dyn ModelProvider>,
        );

        Ok(Self {
            model,
            bank: bank.clone(),
            classifier,
            session: SessionState::new(settings.profile),
            mute,
            solo,
            long_press_tx,
        })
    }

    /// Feed a classified event (from the timer task) back into the commands.
    pub fn handle_button_event(&mut self, button: Button, event: ButtonEvent) -> Result<()> {
        match button {
            Button::Mute => self.mute.execute(event, &mut self.session),
            Button::Solo => self.solo.execute(event, &mut self.session),
            Button::Shift | Button::Scene(_) => {}
        }
        self.bank.refresh()?;
        self.print_function_leds();
        Ok(())
    }

    /// Process one console line.
    pub fn handle_line(&mut self, line: &str) -> Result<ConsoleOutcome> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => return Ok(ConsoleOutcome::Quit),
            ["help"] => print_help(),
            ["press", token] => self.press(token)?,
            ["release", token] => self.release(token)?,
            ["tap", token] => {
                self.press(token)?;
                self.release(token)?;
            }
            ["note", track, note, velocity] => {
                self.note(track.parse()?, note.parse()?, velocity.parse()?)?;
            }
            ["select", "none"] => {
                self.model.clear_selection();
                self.bank.refresh()?;
            }
            ["select", index] => {
                if !self.model.select_window(index.parse()?) {
                    warn!("no track at window index {}", index);
                }
                self.bank.refresh()?;
            }
            ["layer", "none"] => {
                self.model.select_layer(None);
            }
            ["layer", index] => {
                if !self.model.select_layer(Some(index.parse()?)) {
                    warn!("no layer {}", index);
                }
            }
            ["mode", token] => self.switch_mode(token),
            ["scroll", direction] => self.scroll_tracks(direction)?,
            ["scenes", direction] => self.scroll_scenes(direction),
            ["launch", scene] => {
                let scene: usize = scene.parse()?;
                if scene < self.bank.num_scenes() {
                    self.bank.launch_scene(scene);
                } else {
                    warn!("scene {} outside the window", scene);
                }
            }
            ["stop"] => self.bank.stop(),
            ["rec", track, scene] => {
                self.model
                    .toggle_slot_recording(track.parse()?, scene.parse()?);
                println!(
                    "recording anywhere in window: {}",
                    self.bank.is_any_clip_recording()
                );
            }
            ["grid"] => self.print_grid(),
            ["state"] => self.print_state()?,
            _ => warn!("unknown command: '{}' (try 'help')", line.trim()),
        }
        Ok(ConsoleOutcome::Continue)
    }

    fn press(&mut self, token: &str) -> Result<()> {
        let Some(button) = Button::parse(token) else {
            warn!("unknown button '{}'", token);
            return Ok(());
        };
        if self.classifier.is_pressed(button) {
            // The REPL stands in for hardware; hardware never double-presses
            warn!("{} is already pressed", button);
            return Ok(());
        }
        let (down, token) = self.classifier.press(button);
        match button {
            Button::Shift => self.session.set_shift_held(true),
            Button::Mute | Button::Solo => {
                self.handle_button_event(button, down)?;
                arm_long_press(self.classifier.clone(), token, self.long_press_tx.clone());
            }
            Button::Scene(scene) => {
                let scene = scene as usize;
                if scene < self.bank.num_scenes() {
                    self.bank.launch_scene(scene);
                } else {
                    warn!("scene {} outside the window", scene);
                }
            }
        }
        Ok(())
    }

    fn release(&mut self, token: &str) -> Result<()> {
        let Some(button) = Button::parse(token) else {
            warn!("unknown button '{}'", token);
            return Ok(());
        };
        if !self.classifier.is_pressed(button) {
            warn!("{} is not pressed", button);
            return Ok(());
        }
        let up = self.classifier.release(button);
        match button {
            Button::Shift => self.session.set_shift_held(false),
            Button::Mute | Button::Solo => self.handle_button_event(button, up)?,
            Button::Scene(_) => {}
        }
        Ok(())
    }

    /// A note from a pad row: update the cache, fan out, render the pad.
    fn note(&mut self, track: usize, note: u8, velocity: u8) -> Result<()> {
        if track >= self.bank.num_tracks() {
            warn!("track {} outside the window", track);
            return Ok(());
        }
        if note > 127 {
            warn!("note {} out of range", note);
            return Ok(());
        }
        let prior = self.bank.record_note(track, note, velocity);
        let current = self.bank.note_state(track, note);
        self.bank.notify_note(note, velocity)?;

        let color = self.bank.channel(track).color;
        match feedback::pad_led(prior, current, color) {
            Some(PadLed::Off) => println!("pad {}/{}: {}", track, note, "off".dimmed()),
            Some(PadLed::On(c)) => println!("pad {}/{}: {}", track, note, "on".color(paint(c))),
            Some(PadLed::Flash(c)) => {
                println!("pad {}/{}: {}", track, note, "flash".color(paint(c)).bold())
            }
            None => println!("pad {}/{}: unchanged", track, note),
        }
        Ok(())
    }

    fn switch_mode(&mut self, token: &str) {
        let Some(mode) = crate::modes::Mode::parse(token) else {
            warn!("unknown mode '{}'", token);
            return;
        };
        self.session.set_active_mode(mode);
        // A mode change invalidates pending long presses so no stale LONG
        // fires into the new context
        self.classifier.cancel(Button::Mute);
        self.classifier.cancel(Button::Solo);
    }

    fn scroll_tracks(&mut self, direction: &str) -> Result<()> {
        match direction {
            "up" => self.bank.scroll_tracks_up()?,
            "down" => self.bank.scroll_tracks_down()?,
            "pageup" => self.bank.scroll_tracks_page_up()?,
            "pagedown" => self.bank.scroll_tracks_page_down()?,
            _ => warn!("unknown scroll direction '{}'", direction),
        }
        Ok(())
    }

    fn scroll_scenes(&mut self, direction: &str) {
        match direction {
            "up" => self.bank.scroll_scenes_up(),
            "down" => self.bank.scroll_scenes_down(),
            "pageup" => self.bank.scroll_scenes_page_up(),
            "pagedown" => self.bank.scroll_scenes_page_down(),
            _ => warn!("unknown scenes direction '{}'", direction),
        }
    }

    fn print_function_leds(&self) {
        let led = |f| match feedback::function_led(&self.session, f) {
            FunctionLed::Off => "off".dimmed(),
            FunctionLed::On => "on".green(),
            FunctionLed::Bright => "locked".green().bold(),
        };
        println!(
            "leds: mute={} solo={}",
            led(TrackFunction::Mute),
            led(TrackFunction::Solo)
        );
    }

    fn print_grid(&self) {
        // Header: channel strip per window column
        let mut header = String::new();
        for i in 0..self.bank.num_tracks() {
            let channel = self.bank.channel(i);
            let mut label = if channel.exists {
                format!("{:>7}", truncate(&channel.name, 7))
            } else {
                format!("{:>7}", "-")
            };
            if channel.selected {
                label = label.as_str().bold().underline().to_string();
            }
            header.push_str(&label);
            header.push(' ');
        }
        println!("{}", header);

        let mut flags = String::new();
        for i in 0..self.bank.num_tracks() {
            let channel = self.bank.channel(i);
            let m = if channel.mute { "M".red().to_string() } else { " ".to_string() };
            let s = if channel.solo { "S".yellow().to_string() } else { " ".to_string() };
            flags.push_str(&format!("{:>6}{}{} ", "", m, s));
        }
        println!("{}", flags);

        for scene in 0..self.bank.num_scenes() {
            let mut row = String::new();
            for track in 0..self.bank.num_tracks() {
                let slot = self.model.slot(track, scene);
                let cell = if slot.recording {
                    "●".red().to_string()
                } else if slot.has_content {
                    "■".color(paint(slot.color)).to_string()
                } else if slot.exists {
                    "·".dimmed().to_string()
                } else {
                    " ".to_string()
                };
                row.push_str(&format!("{:>7} ", cell));
            }
            let scene_color = self.bank.color_of_first_clip_in_scene(scene);
            println!("{} {}", row, "▶".color(paint(scene_color)));
        }
        println!("scene position: {}", self.bank.scene_position());
    }

    fn print_state(&self) -> Result<()> {
        let snapshot = StateSnapshot {
            session: &self.session,
            scene_position: self.bank.scene_position(),
            selected_track: self.bank.selected_channel().map(|c| c.index),
            any_clip_recording: self.bank.is_any_clip_recording(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }
}

/// Map a float color to the nearest terminal color.
fn paint(color: Color) -> colored::Color {
    if color.r > 0.5 && color.g > 0.5 {
        colored::Color::Yellow
    } else if color.r > 0.5 && color.b > 0.5 {
        colored::Color::Magenta
    } else if color.g > 0.5 && color.b > 0.5 {
        colored::Color::Cyan
    } else if color.r > 0.5 {
        colored::Color::Red
    } else if color.g > 0.5 {
        colored::Color::Green
    } else if color.b > 0.5 {
        colored::Color::Blue
    } else {
        colored::Color::White
    }
}

fn truncate(text: &str, max: usize) -> &str {
    &text[..text.len().min(max)]
}

fn print_help() {
    println!("{}", "Surface console commands".bold());
    println!("  press|release|tap <mute|solo|shift|sceneN>");
    println!("  note <track> <note> <velocity>   pad input (velocity 0 = off)");
    println!("  select <index|none>              select a window track");
    println!("  layer <index|none>               select a device layer");
    println!("  mode <track|volume|pan|send|layer|master|browse>");
    println!("  scroll <up|down|pageup|pagedown>    track window");
    println!("  scenes <up|down|pageup|pagedown>    scene window");
    println!("  launch <scene> | stop            scene control");
    println!("  rec <track> <scene>              toggle slot recording");
    println!("  grid | state | help | quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceSettings;

    fn console() -> SurfaceConsole {
        let (tx, _rx) = mpsc::unbounded_channel();
        SurfaceConsole::new(&SurfaceSettings::default(), tx).unwrap()
    }

    #[tokio::test]
    async fn test_tap_mute_toggles_selected_track() {
        let mut console = console();
        console.handle_line("select 0").unwrap();
        console.handle_line("press mute").unwrap();
        console.handle_line("release mute").unwrap();
        assert!(console.bank.channel(0).mute);
    }

    #[tokio::test]
    async fn test_shift_tap_locks() {
        let mut console = console();
        console.handle_line("press shift").unwrap();
        console.handle_line("tap mute").unwrap();
        console.handle_line("release shift").unwrap();
        assert!(console.session.is_locked());
    }

    #[test]
    fn test_quit_outcome() {
        let mut console = console();
        assert_eq!(console.handle_line("quit").unwrap(), ConsoleOutcome::Quit);
        assert_eq!(
            console.handle_line("grid").unwrap(),
            ConsoleOutcome::Continue
        );
    }

    #[test]
    fn test_note_updates_cache() {
        let mut console = console();
        console.handle_line("note 1 60 100").unwrap();
        assert_eq!(
            console.bank.note_state(1, 60),
            crate::notecache::NoteState::On
        );
        console.handle_line("note 1 60 0").unwrap();
        assert_eq!(
            console.bank.note_state(1, 60),
            crate::notecache::NoteState::Off
        );
    }

    #[test]
    fn test_unknown_command_is_tolerated() {
        let mut console = console();
        assert_eq!(
            console.handle_line("frobnicate 7").unwrap(),
            ConsoleOutcome::Continue
        );
    }
}
