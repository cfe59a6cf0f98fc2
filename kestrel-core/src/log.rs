//! Simple logger shared by every engine subsystem: writes to stdout/stderr
//! and fans messages out to any number of registered listeners.

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// A single recorded message.
pub struct LogMessage {
    pub kind: MessageKind,
    pub content: String,
    pub time: Duration,
}

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Ord, Hash, Debug)]
#[repr(u32)]
pub enum MessageKind {
    Information = 0,
    Warning = 1,
    Error = 2,
}

impl MessageKind {
    fn as_str(self) -> &'static str {
        match self {
            MessageKind::Information => "[INFO]: ",
            MessageKind::Warning => "[WARNING]: ",
            MessageKind::Error => "[ERROR]: ",
        }
    }
}

type Listener = Box<dyn Fn(&LogMessage) + Send>;

pub struct Log {
    verbosity: MessageKind,
    listeners: Vec<Listener>,
    time_origin: Instant,
}

lazy_static! {
    static ref LOG: Mutex<Log> = Mutex::new(Log {
        verbosity: MessageKind::Information,
        listeners: Vec::new(),
        time_origin: Instant::now(),
    });
}

impl Log {
    fn write(kind: MessageKind, content: String) {
        let mut log = LOG.lock();
        if kind < log.verbosity {
            return;
        }

        let message = LogMessage {
            kind,
            content,
            time: log.time_origin.elapsed(),
        };

        match kind {
            MessageKind::Error => eprintln!("{}{}", kind.as_str(), message.content),
            _ => println!("{}{}", kind.as_str(), message.content),
        }

        for listener in &log.listeners {
            listener(&message);
        }
    }

    /// Sets the minimum severity that will be written/broadcast.
    pub fn set_verbosity(kind: MessageKind) {
        LOG.lock().verbosity = kind;
    }

    /// Registers a listener that receives every subsequent message at or
    /// above the current verbosity. There is no way to unregister one
    /// directly; scope listener lifetime with a [`crate::signal::Signal`]
    /// instead if it needs to come and go.
    pub fn add_listener<F: Fn(&LogMessage) + Send + 'static>(listener: F) {
        LOG.lock().listeners.push(Box::new(listener));
    }

    pub fn info<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Information, msg.as_ref().to_owned());
    }

    pub fn warn<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Warning, msg.as_ref().to_owned());
    }

    pub fn err<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Error, msg.as_ref().to_owned());
    }
}
