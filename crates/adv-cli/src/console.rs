use std::io::{self, BufRead, Write};
use std::thread;

use adv_core::AdventureError;
use adv_runtime::{PlayerHandle, StoryDisplay};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputRequest {
    Choice,
    Acknowledge,
}

/// Prints the story to stdout and asks the input reader for one line each
/// time the player waits on the reader.
pub(crate) struct ConsoleDisplay {
    requests: UnboundedSender<InputRequest>,
}

impl ConsoleDisplay {
    pub(crate) fn new(requests: UnboundedSender<InputRequest>) -> Self {
        Self { requests }
    }

    fn request(&self, request: InputRequest) {
        print!("> ");
        if let Err(error) = io::stdout().flush() {
            log::debug!("stdout flush failed: {}", error);
        }
        if self.requests.send(request).is_err() {
            log::debug!("input reader is gone; {:?} dropped", request);
        }
    }
}

impl StoryDisplay for ConsoleDisplay {
    fn show_text(&self, text: &str) {
        println!("{}", text);
    }

    fn show_prompt(&self, text: &str) {
        println!();
        println!("{}", text);
    }

    fn show_option(&self, key: &str, text: &str) {
        println!("  [{}] {}", key, text);
    }

    fn request_choice(&self) {
        self.request(InputRequest::Choice);
    }

    fn request_acknowledge(&self) {
        self.request(InputRequest::Acknowledge);
    }

    fn unknown_choice(&self, key: &str) {
        println!("unknown choice: {}", key);
    }

    fn play_failed(&self, error: &AdventureError) {
        println!("[FAILED] {}: {}", error.code, error.message);
    }

    fn on_end(&self) {
        println!("[END]");
    }
}

/// Answers each request with the next input line. Stops on end of input,
/// when the display goes away, or when the player stops accepting commands.
pub(crate) fn forward_input(
    input: impl BufRead,
    mut requests: UnboundedReceiver<InputRequest>,
    handle: PlayerHandle,
) {
    let mut lines = input.lines();

    while let Some(request) = requests.blocking_recv() {
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                log::warn!("input read failed: {}", error);
                break;
            }
            None => {
                log::debug!("input closed");
                break;
            }
        };

        let sent = match request {
            InputRequest::Choice => handle.choose(line.trim()),
            InputRequest::Acknowledge => handle.acknowledge(),
        };
        if let Err(error) = sent {
            log::debug!("input dropped: {}", error);
            break;
        }
    }
}

/// Detached: a reader blocked on stdin must not keep the process alive.
pub(crate) fn spawn_stdin_reader(requests: UnboundedReceiver<InputRequest>, handle: PlayerHandle) {
    thread::spawn(move || forward_input(io::stdin().lock(), requests, handle));
}
