use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::BackdropConfig;

pub const BACKGROUNDS: [&str; 4] = ["bg1.jpg", "bg2.jpg", "bg3.jpg", "bg4.jpg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub visible: bool,
}

/// Rotating background behind the tracker and history screens.
///
/// Every `interval` the frame fades out, then after `fade` the next image
/// fades in. The timer task stops when the handle is dropped.
pub struct Backdrop {
    frames: watch::Receiver<Frame>,
    images: &'static [&'static str],
    task: JoinHandle<()>,
}

impl Backdrop {
    pub fn start(config: &BackdropConfig) -> Self {
        Self::with_images(&BACKGROUNDS, config.interval, config.fade)
    }

    pub fn with_images(images: &'static [&'static str], interval: Duration, fade: Duration) -> Self {
        let (tx, frames) = watch::channel(Frame {
            index: 0,
            visible: true,
        });
        let len = images.len().max(1);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                tx.send_modify(|f| f.visible = false);
                time::sleep(fade).await;
                tx.send_modify(|f| {
                    f.index = (f.index + 1) % len;
                    f.visible = true;
                });
            }
        });

        Self {
            frames,
            images,
            task,
        }
    }

    pub fn frame(&self) -> Frame {
        *self.frames.borrow()
    }

    pub fn image(&self) -> &'static str {
        self.images.get(self.frame().index).copied().unwrap_or_default()
    }

    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdrop() -> Backdrop {
        Backdrop::start(&BackdropConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn fades_out_then_advances() {
        let bd = backdrop();
        assert_eq!(bd.frame(), Frame { index: 0, visible: true });
        assert_eq!(bd.image(), "bg1.jpg");

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(bd.frame(), Frame { index: 0, visible: false });

        time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(bd.frame(), Frame { index: 1, visible: true });
        assert_eq!(bd.image(), "bg2.jpg");
    }

    #[tokio::test(start_paused = true)]
    async fn wraps_around_after_last_image() {
        let bd = backdrop();

        // four full cycles at 5s each
        time::sleep(Duration::from_millis(20_000 + 1_500)).await;
        assert_eq!(bd.frame(), Frame { index: 0, visible: true });

        time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(bd.frame().index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_timer() {
        let bd = backdrop();
        let mut rx = bd.subscribe();
        drop(bd);

        // sender goes away with the aborted task
        assert!(rx.changed().await.is_err());
    }
}
