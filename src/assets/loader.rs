use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    time::{Duration, Instant},
};

use crate::{
    assets::{
        convention::{ConventionTable, fallback_extension},
        decode::{PreparedFrame, decode_frame},
        fetch::FrameFetcher,
        sequence::{FrameSequence, LoadProgress},
    },
    foundation::{
        core::{FrameIndex, ViewportClass},
        error::{FilmrollError, FilmrollResult},
    },
};

/// Where fetch + decode work runs.
#[derive(Clone)]
pub enum Dispatch {
    /// Run each request immediately on the calling thread. Results are still delivered
    /// through the completion queue, so they only land on the next drain.
    Inline,
    /// Run requests on a rayon thread pool.
    Pool(Arc<rayon::ThreadPool>),
}

impl Dispatch {
    /// Build a pool dispatcher; `threads = None` uses rayon's default size.
    pub fn pool(threads: Option<usize>) -> FilmrollResult<Self> {
        if let Some(n) = threads
            && n == 0
        {
            return Err(FilmrollError::validation(
                "loader 'threads' must be >= 1 when set",
            ));
        }

        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("filmroll-load-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| FilmrollError::Other(anyhow::anyhow!("build loader thread pool: {e}")))?;
        Ok(Self::Pool(Arc::new(pool)))
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline => f.write_str("Inline"),
            Self::Pool(pool) => f
                .debug_struct("Pool")
                .field("threads", &pool.current_num_threads())
                .finish(),
        }
    }
}

/// Something observable happened to a slot of the current sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// The slot now holds a frame. `first` marks the first slot of this load cycle.
    Ready { index: FrameIndex, first: bool },
    /// The primary fetch failed and the slot is being retried with `extension`.
    Retrying { index: FrameIndex, extension: String },
    /// Every attempt failed; the slot stays empty for this load cycle.
    Failed { index: FrameIndex },
}

struct Completion {
    generation: u64,
    index: FrameIndex,
    extension: String,
    result: FilmrollResult<PreparedFrame>,
}

/// Loads a [`FrameSequence`] for one viewport class at a time.
///
/// Requests are independent; results are applied only on the thread that calls
/// [`FrameLoader::drain`]. Switching class bumps the generation, and completions from an
/// older generation are dropped when they arrive.
pub struct FrameLoader {
    fetcher: Arc<dyn FrameFetcher>,
    conventions: ConventionTable,
    frame_count: u32,
    dispatch: Dispatch,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    generation: u64,
    sequence: Option<FrameSequence>,
    in_flight: usize,
}

impl FrameLoader {
    pub fn new(
        fetcher: Arc<dyn FrameFetcher>,
        conventions: ConventionTable,
        frame_count: u32,
        dispatch: Dispatch,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            conventions,
            frame_count,
            dispatch,
            tx,
            rx,
            generation: 0,
            sequence: None,
            in_flight: 0,
        }
    }

    /// Class of the sequence currently being loaded, if any.
    pub fn class(&self) -> Option<ViewportClass> {
        self.sequence.as_ref().map(FrameSequence::class)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    pub fn progress(&self) -> LoadProgress {
        self.sequence
            .as_ref()
            .map(FrameSequence::progress)
            .unwrap_or(LoadProgress {
                loaded: 0,
                total: self.frame_count,
            })
    }

    /// Requests issued but not yet drained, stale generations included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Make sure the sequence for `class` is loading.
    ///
    /// Returns `false` when `class` is already the loaded class. Otherwise the old
    /// sequence is discarded, progress restarts from zero and N fresh requests go out.
    #[tracing::instrument(skip(self), fields(generation = self.generation))]
    pub fn ensure_class(&mut self, class: ViewportClass) -> bool {
        if self.class() == Some(class) {
            return false;
        }

        self.generation += 1;
        self.sequence = Some(FrameSequence::new(class, self.frame_count));
        tracing::debug!(
            generation = self.generation,
            frames = self.frame_count,
            "starting frame load cycle"
        );

        let ext = self.conventions.for_class(class).extension.clone();
        for i in 0..self.frame_count {
            self.issue(class, FrameIndex(i), &ext);
        }
        true
    }

    fn issue(&mut self, class: ViewportClass, index: FrameIndex, extension: &str) {
        let path = self
            .conventions
            .frame_path_with_ext(class, index, extension);
        let job = FetchJob {
            fetcher: Arc::clone(&self.fetcher),
            tx: self.tx.clone(),
            generation: self.generation,
            index,
            extension: extension.to_string(),
            path,
        };
        self.in_flight += 1;
        match &self.dispatch {
            Dispatch::Inline => job.run(),
            Dispatch::Pool(pool) => pool.spawn(move || job.run()),
        }
    }

    /// Apply every completion that has arrived so far, without blocking.
    pub fn drain(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(completion) => events.extend(self.apply(completion)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Drain until nothing is in flight or `timeout` elapses.
    pub fn drain_until_idle(&mut self, timeout: Duration) -> Vec<LoadEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = self.drain();
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(in_flight = self.in_flight, "frame loads still pending");
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(completion) => events.extend(self.apply(completion)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        events
    }

    fn apply(&mut self, completion: Completion) -> Option<LoadEvent> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion {
            generation,
            index,
            extension,
            result,
        } = completion;

        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, ?index, "stale frame ignored");
            return None;
        }
        let sequence = self.sequence.as_mut()?;
        let class = sequence.class();

        match result {
            Ok(frame) => {
                if !sequence.insert(index, frame) {
                    return None;
                }
                let first = sequence.progress().loaded == 1;
                Some(LoadEvent::Ready { index, first })
            }
            Err(err) => match fallback_extension(&extension) {
                Some(fallback) if extension == self.conventions.for_class(class).extension => {
                    tracing::debug!(?index, %err, fallback, "frame fetch failed, retrying");
                    self.issue(class, index, fallback);
                    Some(LoadEvent::Retrying {
                        index,
                        extension: fallback.to_string(),
                    })
                }
                _ => {
                    tracing::warn!(?index, %class, %err, "frame unavailable, slot stays empty");
                    Some(LoadEvent::Failed { index })
                }
            },
        }
    }
}

struct FetchJob {
    fetcher: Arc<dyn FrameFetcher>,
    tx: Sender<Completion>,
    generation: u64,
    index: FrameIndex,
    extension: String,
    path: String,
}

impl FetchJob {
    fn run(self) {
        let result = self
            .fetcher
            .fetch(&self.path)
            .and_then(|bytes| decode_frame(&bytes));
        // The receiver is gone once the loader is dropped; nothing is waiting for this.
        let _ = self.tx.send(Completion {
            generation: self.generation,
            index: self.index,
            extension: self.extension,
            result,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
