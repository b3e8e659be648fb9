//! Scripted transport used by the unit tests.

use std::{
    collections::VecDeque,
    string::String,
    sync::{Arc, Mutex},
    vec::Vec,
};

use embassy_time::Duration;

use crate::{AtTransport, InternalError};

/// A piece of scripted modem output.
#[derive(Debug, Clone, Copy)]
pub enum Chunk<'a> {
    Text(&'a [u8]),
    /// Silence of the given length before the next chunk.
    Gap(Duration),
}

#[derive(Debug, Clone)]
enum Event {
    Byte(u8),
    Gap(Duration),
}

fn events(chunks: &[Chunk]) -> Vec<Event> {
    let mut out = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Text(text) => out.extend(text.iter().map(|b| Event::Byte(*b))),
            Chunk::Gap(d) => out.push(Event::Gap(*d)),
        }
    }
    out
}

/// Transport answering each sent command with scripted bytes.
///
/// Time is simulated: a [`Chunk::Gap`] longer than the wait passed to
/// `read_byte` makes that read return `None` without sleeping.
pub struct MockTransport {
    rx: VecDeque<Event>,
    script: VecDeque<(String, Vec<Event>)>,
    default_reply: Option<Vec<Event>>,
    sent: Vec<String>,
    timeout: Duration,
    timeouts: Vec<Duration>,
    wire: Option<Arc<Mutex<Vec<u8>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            script: VecDeque::new(),
            default_reply: None,
            sent: Vec::new(),
            timeout: Duration::from_millis(500),
            timeouts: Vec::new(),
            wire: None,
        }
    }

    /// Bytes available to read right away.
    pub fn with_input(self, input: &[u8]) -> Self {
        self.with_chunks(&[Chunk::Text(input)])
    }

    pub fn with_chunks(mut self, chunks: &[Chunk]) -> Self {
        self.rx.extend(events(chunks));
        self
    }

    /// Expect `cmd` as the next command and answer it with `reply`.
    pub fn respond(self, cmd: &str, reply: &[u8]) -> Self {
        self.respond_chunks(cmd, &[Chunk::Text(reply)])
    }

    pub fn respond_chunks(mut self, cmd: &str, chunks: &[Chunk]) -> Self {
        self.script.push_back((String::from(cmd), events(chunks)));
        self
    }

    /// Answer every unscripted command with `reply`.
    pub fn respond_any(mut self, reply: &[u8]) -> Self {
        self.default_reply = Some(events(&[Chunk::Text(reply)]));
        self
    }

    /// Mirror every sent byte into `wire`, one byte at a time.
    pub fn with_wire(mut self, wire: Arc<Mutex<Vec<u8>>>) -> Self {
        self.wire = Some(wire);
        self
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Every value passed to `set_timeout`, in order.
    pub fn timeouts(&self) -> &[Duration] {
        &self.timeouts
    }

    pub fn remaining_input(&self) -> Vec<u8> {
        self.rx
            .iter()
            .filter_map(|e| match e {
                Event::Byte(b) => Some(*b),
                Event::Gap(_) => None,
            })
            .collect()
    }

    pub fn script_done(&self) -> bool {
        self.script.is_empty()
    }
}

impl AtTransport for MockTransport {
    fn send(&mut self, line: &[u8]) -> Result<(), InternalError> {
        let line = String::from_utf8_lossy(line).into_owned();

        if let Some(wire) = &self.wire {
            for b in line.bytes().chain(*b"\r\n") {
                wire.lock().unwrap().push(b);
                std::thread::yield_now();
            }
        }

        let reply = match self.script.front() {
            Some((expected, _)) => {
                assert_eq!(expected, &line, "unexpected command");
                self.script.pop_front().map(|(_, reply)| reply)
            }
            None => self.default_reply.clone(),
        };
        if let Some(reply) = reply {
            self.rx.extend(reply);
        }

        self.sent.push(line);
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> Option<u8> {
        loop {
            match self.rx.front_mut()? {
                Event::Byte(b) => {
                    let b = *b;
                    self.rx.pop_front();
                    return Some(b);
                }
                Event::Gap(gap) if *gap > timeout => {
                    *gap = *gap - timeout;
                    return None;
                }
                Event::Gap(_) => {
                    self.rx.pop_front();
                }
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeouts.push(timeout);
        self.timeout = timeout;
    }

    /// Drops what has already arrived, up to the next gap.
    fn flush(&mut self) {
        while let Some(Event::Byte(_)) = self.rx.front() {
            self.rx.pop_front();
        }
    }
}
