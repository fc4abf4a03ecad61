use crate::config::{Config, TimerMode};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use anyhow::{Context, Result};
use log::{debug, info};
use spin_sleep::LoopHelper;
use std::io;

/// Sets everything up and runs the main loop. Each frame:
///  - poll the input device into the keypad snapshot
///  - run a frame's worth of interpreter steps
///  - tick the timers, if the host owns them
///  - present the framebuffer if it changed
///  - sleep off the rest of the frame
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    steps_per_frame: u32,
    frame_rate: u32,
    frames: u64,
    sound_on: bool,
}

impl<'a> Environment<'a> {
    pub fn new(config: &Config, display: &'a mut dyn Display, input: &'a mut dyn Input) -> Self {
        Environment {
            interpreter: Chip8Interpreter::with_config(config.timer_mode, config.seed),
            display,
            input,
            steps_per_frame: config.steps_per_frame(),
            frame_rate: config.frame_rate.max(1),
            frames: 0,
            sound_on: false,
        }
    }

    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.interpreter.load_program(reader)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// the sound timer was running at the end of the last frame
    pub fn sound_active(&self) -> bool {
        self.sound_on
    }

    /// run one frame; false once the user has asked to stop
    pub fn frame(&mut self) -> Result<bool> {
        let mut keypad = self.interpreter.state().keypad;
        self.input.poll_keys(&mut keypad).context("polling input")?;
        if self.input.quit_requested() {
            return Ok(false);
        }
        self.interpreter.set_keypad(keypad);

        for _ in 0..self.steps_per_frame {
            self.interpreter
                .step()
                .with_context(|| format!("frame {}", self.frames))?;
        }

        if self.interpreter.timer_mode() == TimerMode::Fixed {
            self.interpreter.tick_timers();
        }

        // no tone is generated; just note when one would start or stop
        let sound_on = self.interpreter.state().timers.sound_active();
        if sound_on != self.sound_on {
            debug!("sound {} at frame {}", if sound_on { "on" } else { "off" }, self.frames);
            self.sound_on = sound_on;
        }

        if self.interpreter.framebuffer().needs_redraw() {
            self.display
                .draw(self.interpreter.framebuffer())
                .context("drawing the screen")?;
            self.interpreter.clear_redraw();
        }

        self.frames += 1;
        Ok(true)
    }

    /// run frames at the frame rate until the user quits, something goes
    /// wrong, or `max_frames` have run
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<()> {
        let mut loop_helper = LoopHelper::builder()
            .report_interval_s(5.0)
            .build_with_target_rate(self.frame_rate as f64);
        info!(
            "running {} steps per frame at {} frames/s",
            self.steps_per_frame, self.frame_rate
        );

        loop {
            loop_helper.loop_start();
            if !self.frame()? {
                break;
            }
            if let Some(rate) = loop_helper.report_rate() {
                debug!("{:.1} frames/s", rate);
            }
            if max_frames.map_or(false, |max| self.frames >= max) {
                break;
            }
            loop_helper.loop_sleep();
        }

        info!("stopped after {} frames", self.frames);
        Ok(())
    }
}
