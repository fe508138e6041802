use kaleidoscope::control::{Command, Controller};
use kaleidoscope::display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use kaleidoscope::mqtt::MqttClient;
use kaleidoscope::pattern::Pattern;
use kaleidoscope::util::FpsCounter;
use kaleidoscope::{EffectParameters, Filter, FilterError, FilteredImage, Kaleidoscope, PolarView};
use sdl2::keyboard::Keycode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_PARAMS_FILE: &str = "kaleidoscope.json";
const ANGLE_STEP: f32 = 5.0;
const SPIN_DEGREES_PER_SEC: f32 = 30.0;
const TITLE_INTERVAL: f32 = 0.25;

struct Options {
    width: u32,
    height: u32,
    vsync: bool,
    params_path: PathBuf,
    mqtt_host: Option<String>,
    topic: String,
    socket: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        params_path: PathBuf::from(DEFAULT_PARAMS_FILE),
        mqtt_host: None,
        topic: MqttClient::default_topic().to_string(),
        socket: false,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => opts.vsync = false,
            "--socket" => opts.socket = true,
            "--width" | "-w" => {
                if let Some(w) = value.and_then(|v| v.parse().ok()) {
                    opts.width = w;
                }
                i += 1;
            },
            "--height" | "-h" => {
                if let Some(h) = value.and_then(|v| v.parse().ok()) {
                    opts.height = h;
                }
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 1920x1080
                if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                        opts.width = w;
                        opts.height = h;
                    }
                }
                i += 1;
            },
            "--params" => {
                if let Some(path) = value {
                    opts.params_path = PathBuf::from(path);
                }
                i += 1;
            },
            "--mqtt" => {
                opts.mqtt_host = Some(value.cloned().unwrap_or_default());
                i += 1;
            },
            "--topic" => {
                if let Some(topic) = value {
                    opts.topic = topic.clone();
                }
                i += 1;
            },
            "--help" => {
                println!("Usage: kaleidoscope [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W           Set window width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H          Set window height (default: {})", DEFAULT_HEIGHT);
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --no-vsync                Disable VSync for uncapped framerate");
                println!("  --params FILE             Parameter file (default: {})", DEFAULT_PARAMS_FILE);
                println!("  --socket                  Listen for commands on {}", Controller::socket_path());
                println!(
                    "  --mqtt HOST               Subscribe to parameter updates (default host: {})",
                    MqttClient::default_host()
                );
                println!("  --topic TOPIC             MQTT topic (default: {})", MqttClient::default_topic());
                println!("  --help                    Show this help message");
                println!();
                println!("Set RUST_LOG to control log output (default: info).");
                std::process::exit(0);
            },
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    opts
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn pattern_for_key(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0),
        Keycode::Num2 => Some(1),
        Keycode::Num3 => Some(2),
        Keycode::Num4 => Some(3),
        Keycode::Num5 => Some(4),
        Keycode::Num6 => Some(5),
        _ => None,
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Viewer state shared by keyboard, socket and MQTT input
struct Viewer {
    params: EffectParameters,
    params_path: PathBuf,
    pattern: Pattern,
    image: FilteredImage,
    spin: bool,
    show_fps: bool,
    show_polar: bool,
    width: u32,
    height: u32,
}

impl Viewer {
    fn select_pattern(&mut self, index: usize) {
        if let Some(&pattern) = Pattern::ALL.get(index) {
            self.pattern = pattern;
            self.image.set_source(pattern.render(self.width, self.height));
            tracing::info!(pattern = pattern.name(), "source pattern");
        } else {
            tracing::warn!(index, "no such pattern");
        }
    }

    fn set_params(&mut self, params: EffectParameters) {
        if params != self.params {
            self.params = params;
            self.image.mark_stale();
        }
    }

    fn save(&self) {
        match self.params.save(&self.params_path) {
            Ok(()) => tracing::info!(path = %self.params_path.display(), "parameters saved"),
            Err(e) => tracing::error!(path = %self.params_path.display(), error = %e, "failed to save"),
        }
    }

    fn load(&mut self) {
        match EffectParameters::load(&self.params_path) {
            Ok(params) => {
                self.set_params(params);
                tracing::info!(path = %self.params_path.display(), "parameters loaded");
            },
            Err(e) => tracing::error!(path = %self.params_path.display(), error = %e, "failed to load"),
        }
    }

    /// Returns false on quit
    fn handle_key(&mut self, key: Keycode) -> bool {
        let mut params = self.params;
        match key {
            Keycode::Escape => return false,
            Keycode::Up => params.power = params.power.round() + 1.0,
            Keycode::Down => params.power = (params.power.round() - 1.0).max(0.0),
            Keycode::Left => params.angle = wrap_degrees(params.angle - ANGLE_STEP),
            Keycode::Right => params.angle = wrap_degrees(params.angle + ANGLE_STEP),
            Keycode::LeftBracket => {
                params.polar_rotation = wrap_degrees(params.polar_rotation - ANGLE_STEP);
            },
            Keycode::RightBracket => {
                params.polar_rotation = wrap_degrees(params.polar_rotation + ANGLE_STEP);
            },
            Keycode::Space => self.spin = !self.spin,
            Keycode::Tab => {
                self.show_polar = !self.show_polar;
                self.image.mark_stale();
            },
            Keycode::F => self.show_fps = !self.show_fps,
            Keycode::S => self.save(),
            Keycode::L => self.load(),
            other => {
                if let Some(index) = pattern_for_key(other) {
                    self.select_pattern(index);
                }
            },
        }
        self.set_params(params);
        true
    }

    /// Returns false on quit
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Set(update) => {
                if update.apply_to(&mut self.params) {
                    self.image.mark_stale();
                }
            },
            // Numbered from 1 like the keys
            Command::Pattern(n) => self.select_pattern(n.wrapping_sub(1)),
            Command::ToggleSpin => self.spin = !self.spin,
            Command::ToggleFps => self.show_fps = !self.show_fps,
            Command::Save => self.save(),
            Command::Load => self.load(),
            Command::Quit => return false,
        }
        true
    }

    fn title(&self, avg_fps: f32) -> String {
        let mut title = format!(
            "kaleidoscope - {} | power {} angle {} rotation {}",
            self.pattern.name(),
            self.params.power,
            self.params.angle.round(),
            self.params.polar_rotation.round()
        );
        if self.show_polar {
            title.push_str(" | polar view");
        }
        if self.spin {
            title.push_str(" | spin");
        }
        if self.show_fps {
            title.push_str(&format!(" | {:.0} fps", avg_fps));
        }
        title
    }
}

fn main() -> Result<(), String> {
    init_logging();
    let opts = parse_args();
    let (width, height) = (opts.width, opts.height);

    let (mut display, texture_creator) =
        Display::with_options("kaleidoscope", width, height, opts.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;

    let params = if opts.params_path.exists() {
        EffectParameters::load(&opts.params_path).unwrap_or_else(|e| {
            tracing::warn!(path = %opts.params_path.display(), error = %e, "using default parameters");
            EffectParameters::default()
        })
    } else {
        EffectParameters::default()
    };

    let pattern = Pattern::Plasma;
    let mut viewer = Viewer {
        params,
        params_path: opts.params_path,
        pattern,
        image: FilteredImage::new(pattern.render(width, height)),
        spin: false,
        show_fps: false,
        show_polar: false,
        width,
        height,
    };

    // Remote feeds are optional; a failure to start one is not fatal
    let controller = if opts.socket {
        Controller::new()
            .map_err(|e| tracing::error!(error = %e, "control socket unavailable"))
            .ok()
    } else {
        None
    };
    let mqtt = opts.mqtt_host.as_deref().and_then(|host| {
        MqttClient::new(host, &opts.topic)
            .map_err(|e| tracing::error!(error = %e, "MQTT unavailable"))
            .ok()
    });

    let mut kaleidoscope = Kaleidoscope::new();
    let mut polar_view = PolarView::new();
    let mut fps_counter = FpsCounter::new(60);
    let mut title_timer = 0.0;
    let mut last_error: Option<FilterError> = None;

    tracing::info!(width, height, vsync = opts.vsync, "kaleidoscope viewer started");
    println!("Controls:");
    println!("  Up/Down     - Power +/- 1");
    println!("  Left/Right  - Angle +/- {}", ANGLE_STEP);
    println!("  [ / ]       - Polar rotation +/- {}", ANGLE_STEP);
    println!("  Space       - Toggle angle spin");
    println!("  Tab         - Toggle polar view");
    println!("  1-6         - Source pattern");
    println!("  S / L       - Save / load parameters");
    println!("  F           - Toggle FPS in title");
    println!("  Escape      - Quit");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => {
                    if !viewer.handle_key(key) {
                        break 'main;
                    }
                },
                InputEvent::KeyUp(_) => {},
            }
        }

        if let Some(controller) = &controller {
            for cmd in controller.poll() {
                if !viewer.handle_command(cmd) {
                    break 'main;
                }
            }
        }

        if let Some(update) = mqtt.as_ref().and_then(MqttClient::poll) {
            viewer.handle_command(Command::Set(update));
        }

        if viewer.spin {
            let mut params = viewer.params;
            params.angle = wrap_degrees(params.angle + SPIN_DEGREES_PER_SEC * dt);
            viewer.set_params(params);
        }

        let filter: &mut dyn Filter = if viewer.show_polar {
            &mut polar_view
        } else {
            &mut kaleidoscope
        };
        match viewer.image.output(filter, &viewer.params) {
            Ok(_) => last_error = None,
            Err(e) => {
                if last_error.as_ref() != Some(&e) {
                    tracing::warn!(error = %e, filter = filter.name(), "filter failed");
                }
                last_error = Some(e);
            },
        }
        let frame = viewer.image.cached().unwrap_or_else(|| viewer.image.source());
        display.present(&mut target, frame)?;

        title_timer += dt;
        if title_timer >= TITLE_INTERVAL {
            title_timer = 0.0;
            display.set_title(&viewer.title(avg_fps))?;
        }
    }

    Ok(())
}
