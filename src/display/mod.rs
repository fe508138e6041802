mod pixel_buffer;

pub use pixel_buffer::{store_channel, PixelBuffer, CHANNELS};

#[cfg(feature = "viewer")]
pub use window::{Display, InputEvent, RenderTarget};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

#[cfg(feature = "viewer")]
mod window {
    use super::{PixelBuffer, CHANNELS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;
    use sdl2::pixels::PixelFormatEnum;
    use sdl2::render::{Canvas, Texture, TextureCreator};
    use sdl2::video::{Window, WindowContext};
    use sdl2::EventPump;

    pub struct Display {
        canvas: Canvas<Window>,
        event_pump: EventPump,
        width: u32,
        height: u32,
    }

    pub struct RenderTarget<'a> {
        texture: Texture<'a>,
        width: u32,
        height: u32,
    }

    #[derive(Debug, Clone)]
    pub enum InputEvent {
        Quit,
        KeyDown(Keycode),
        KeyUp(Keycode),
    }

    impl Display {
        /// Create display with VSync enabled at the default resolution
        pub fn new(title: &str) -> Result<(Self, TextureCreator<WindowContext>), String> {
            Self::with_options(title, DEFAULT_WIDTH, DEFAULT_HEIGHT, true)
        }

        /// Create display with custom resolution and VSync settings
        /// vsync=true: locked to monitor refresh (typically 60fps)
        /// vsync=false: uncapped framerate for performance testing
        pub fn with_options(
            title: &str,
            width: u32,
            height: u32,
            vsync: bool,
        ) -> Result<(Self, TextureCreator<WindowContext>), String> {
            let sdl_context = sdl2::init()?;
            let video_subsystem = sdl_context.video()?;

            let window = video_subsystem
                .window(title, width, height)
                .position_centered()
                .build()
                .map_err(|e| e.to_string())?;

            let mut canvas_builder = window.into_canvas().accelerated();
            if vsync {
                canvas_builder = canvas_builder.present_vsync();
            }
            let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

            let texture_creator = canvas.texture_creator();
            let event_pump = sdl_context.event_pump()?;

            Ok((
                Self {
                    canvas,
                    event_pump,
                    width,
                    height,
                },
                texture_creator,
            ))
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn set_title(&mut self, title: &str) -> Result<(), String> {
            self.canvas
                .window_mut()
                .set_title(title)
                .map_err(|e| e.to_string())
        }

        pub fn present(
            &mut self,
            target: &mut RenderTarget,
            buffer: &PixelBuffer,
        ) -> Result<(), String> {
            if buffer.width() != target.width || buffer.height() != target.height {
                return Err(format!(
                    "buffer is {}x{} but render target is {}x{}",
                    buffer.width(),
                    buffer.height(),
                    target.width,
                    target.height
                ));
            }
            target
                .texture
                .update(None, buffer.as_bytes(), buffer.width() as usize * CHANNELS)
                .map_err(|e| e.to_string())?;

            self.canvas.copy(&target.texture, None, None)?;
            self.canvas.present();
            Ok(())
        }

        pub fn poll_events(&mut self) -> Vec<InputEvent> {
            let mut events = Vec::new();

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => events.push(InputEvent::Quit),
                    Event::KeyDown {
                        keycode: Some(k), ..
                    } => events.push(InputEvent::KeyDown(k)),
                    Event::KeyUp {
                        keycode: Some(k), ..
                    } => events.push(InputEvent::KeyUp(k)),
                    _ => {},
                }
            }

            events
        }
    }

    impl<'a> RenderTarget<'a> {
        /// Streaming texture whose byte layout matches `PixelBuffer`.
        /// ABGR8888 is a packed little-endian format, so its bytes read R, G, B, A.
        pub fn with_size(
            texture_creator: &'a TextureCreator<WindowContext>,
            width: u32,
            height: u32,
        ) -> Result<Self, String> {
            let texture = texture_creator
                .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
                .map_err(|e| e.to_string())?;
            Ok(Self {
                texture,
                width,
                height,
            })
        }
    }
}
