use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::io;
use std::time::Duration;

/// The 16-key hex pad, one flag per logical key 0x0-0xF. The host writes it,
/// the interpreter only reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad([bool; 16]);

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// keys above 0xF are folded onto the pad
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0[(key & 0x0f) as usize]
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.0[(key & 0x0f) as usize] = pressed;
    }

    /// lowest-numbered key that is down
    pub fn first_pressed(&self) -> Option<u8> {
        self.0.iter().position(|k| *k).map(|k| k as u8)
    }

    pub fn release_all(&mut self) {
        self.0 = [false; 16];
    }
}

impl From<[bool; 16]> for Keypad {
    fn from(keys: [bool; 16]) -> Self {
        Keypad(keys)
    }
}

/// left-hand side of a qwerty keyboard, laid out like the COSMAC VIP pad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses (and auto-repeat), so a key counts as held
/// for this many polls after the last event for it
const KEY_HOLD_POLLS: u8 = 8;

/// reads keypresses into a keypad snapshot
pub trait Input {
    /// bring the keypad up to date with the device
    fn poll_keys(&mut self, keypad: &mut Keypad) -> Result<(), io::Error>;

    /// has the user asked to stop
    fn quit_requested(&self) -> bool;
}

/// implementation of Input for a terminal in raw mode, using crossterm
pub struct CrosstermInput {
    keymap: HashMap<char, u8>,
    held: [u8; 16],
    quit: bool,
    /// chars already reported as unmapped
    unmapped: HashSet<char>,
}

impl CrosstermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(CrosstermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; 16],
            quit: false,
            unmapped: HashSet::new(),
        })
    }

    /// one terminal key event; returns the pad key it maps to, if any
    fn handle_key(&mut self, code: KeyCode) -> Option<u8> {
        match code {
            KeyCode::Esc => {
                self.quit = true;
                None
            }
            KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                Some(mapped_key) => Some(*mapped_key),
                None => {
                    // stderr shares the terminal with the canvas; say it once
                    if self.unmapped.insert(c) {
                        debug!("can't map {:?} to a CHIP-8 key", c);
                    }
                    None
                }
            },
            _ => None,
        }
    }

    /// age held keys by one poll and refresh any that were just pressed
    fn update_held(&mut self, pressed: &[u8], keypad: &mut Keypad) {
        for count in self.held.iter_mut() {
            *count = count.saturating_sub(1);
        }
        for key in pressed {
            self.held[*key as usize] = KEY_HOLD_POLLS;
        }
        for (key, count) in self.held.iter().enumerate() {
            keypad.set(key as u8, *count > 0);
        }
    }
}

impl Drop for CrosstermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for CrosstermInput {
    fn poll_keys(&mut self, keypad: &mut Keypad) -> Result<(), io::Error> {
        let mut pressed = Vec::new();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if let Some(key) = self.handle_key(evt.code) {
                    pressed.push(key);
                }
            }
        }
        self.update_held(&pressed, keypad);
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: replays one keypad snapshot per
/// poll, then asks to quit once the script runs out
pub struct DummyInput {
    script: Vec<Keypad>,
    polls: usize,
}

impl DummyInput {
    pub fn new(script: &[Keypad]) -> Self {
        DummyInput {
            script: Vec::from(script),
            polls: 0,
        }
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl Input for DummyInput {
    fn poll_keys(&mut self, keypad: &mut Keypad) -> Result<(), io::Error> {
        if let Some(snapshot) = self.script.get(self.polls) {
            *keypad = *snapshot;
        }
        self.polls += 1;
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.polls > self.script.len()
    }
}
