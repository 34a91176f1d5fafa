use std::thread::{self, JoinHandle};

use async_channel::{Receiver, Sender};
use log::{error, info};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::image::Png;
use crate::storage::Storage;
use crate::{write_png, RenderReply, RenderReq};

// Serve render requests until the request channel closes.
pub fn render_producer(
    req_receiver: Receiver<RenderReq>,
    reply_sender: Sender<RenderReply>,
    mut storage: Box<dyn Storage>,
) {
    info!("render worker running");
    while let Ok(req) = req_receiver.recv_blocking() {
        let encoder = Png::new(req.config.compression);
        let result = write_png(&req.config, &encoder, storage.as_mut());
        if let Err(e) = &result {
            error!("render of {} failed: {e}", req.config.file_name);
        }
        if reply_sender.send_blocking(RenderReply { result }).is_err() {
            break;
        }
    }
    info!("render worker stopped");
}

/// A dedicated thread that owns the storage and renders one image at a time.
pub struct RenderWorker {
    req_sender: Sender<RenderReq>,
    reply_receiver: Receiver<RenderReply>,
    handle: JoinHandle<()>,
}

impl RenderWorker {
    pub fn spawn(storage: Box<dyn Storage>) -> Result<RenderWorker> {
        let (req_sender, req_receiver) = async_channel::unbounded();
        let (reply_sender, reply_receiver) = async_channel::bounded(1);
        let handle = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || render_producer(req_receiver, reply_sender, storage))
            .map_err(Error::Spawn)?;
        Ok(RenderWorker {
            req_sender,
            reply_receiver,
            handle,
        })
    }

    /// Render, encode and store one image, blocking until the worker replies.
    pub fn render(&self, config: RenderConfig) -> Result<usize> {
        self.req_sender
            .send_blocking(RenderReq { config })
            .map_err(|_| Error::WorkerGone)?;
        let reply = self
            .reply_receiver
            .recv_blocking()
            .map_err(|_| Error::WorkerGone)?;
        reply.result
    }

    pub fn shutdown(self) {
        self.req_sender.close();
        if self.handle.join().is_err() {
            error!("render worker panicked");
        }
    }
}
