//! Voice activity classification for the microphone path
//!
//! Level-based classifier: each frame's peak amplitude is compared against a
//! pair of thresholds with a dead zone between them, and consecutive-frame
//! counters debounce the speaking/silent transitions. The classifier also
//! downmixes stereo input to mono for the downstream consumer.

use serde::{Deserialize, Serialize};

use super::metering;

/// Sink receiving the forwarded (mono) audio frames.
pub type DataSink = Box<dyn FnMut(Vec<i16>) + Send>;

/// Sink receiving speaking/silent transition edges.
pub type ActivitySink = Box<dyn FnMut(bool) + Send>;

/// Configuration for voice activity classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Peak amplitude at or above which a frame counts toward speech.
    pub speech_peak_threshold: i32,

    /// Peak amplitude at or below which a frame counts toward silence.
    ///
    /// Peaks strictly between the two thresholds confirm neither state, so
    /// the classifier does not chatter at the boundary.
    pub silence_peak_threshold: i32,

    /// Consecutive speech frames required to confirm a speaking edge.
    ///
    /// Kept low so the perceived start-of-speech latency stays small.
    /// Default: 2.
    pub speech_frames_to_trigger: u32,

    /// Consecutive silent frames required to confirm a silent edge.
    ///
    /// Kept high so brief pauses between words are not clipped.
    /// Default: 10.
    pub silence_frames_to_trigger: u32,

    /// Frame duration in milliseconds.
    pub frame_duration_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            speech_peak_threshold: 1200,
            silence_peak_threshold: 700,
            speech_frames_to_trigger: 2,
            silence_frames_to_trigger: 10,
            frame_duration_ms: 30,
        }
    }
}

/// Debounced voice activity classifier with stereo downmix.
///
/// Consumes fixed-size frames of interleaved i16 samples, maintains
/// hysteresis counters over the per-frame peak level, and fires
/// edge-triggered speaking/silent transitions into the registered activity
/// sink. Every accepted frame is forwarded to the data sink, downmixed to
/// mono when the input is stereo.
///
/// The classifier is not internally synchronised: `feed`, `start` and `stop`
/// must be called from the same execution context (normally the thread that
/// delivers audio frames), or the caller must provide external
/// synchronisation.
pub struct VoiceActivityClassifier {
    config: VadConfig,
    channels: u16,
    /// Samples per frame per channel.
    frame_samples: usize,
    running: bool,
    speaking: bool,
    speech_frames: u32,
    silence_frames: u32,
    data_sink: Option<DataSink>,
    activity_sink: Option<ActivitySink>,
}

impl VoiceActivityClassifier {
    /// Creates a classifier for the given stream format.
    ///
    /// `channels` must be 1 or 2; anything else is clamped to mono with a
    /// warning rather than rejected, since a misconfigured channel count
    /// must not take down the audio path.
    pub fn new(config: VadConfig, sample_rate: u32, channels: u16) -> Self {
        let channels = match channels {
            1 | 2 => channels,
            other => {
                tracing::warn!("unsupported channel count {other}, falling back to mono");
                1
            }
        };
        let frame_samples = (config.frame_duration_ms * sample_rate / 1000) as usize;

        Self {
            config,
            channels,
            frame_samples,
            running: false,
            speaking: false,
            speech_frames: 0,
            silence_frames: 0,
            data_sink: None,
            activity_sink: None,
        }
    }

    /// Registers the sink receiving forwarded mono frames.
    pub fn on_data(&mut self, sink: impl FnMut(Vec<i16>) + Send + 'static) {
        self.data_sink = Some(Box::new(sink));
    }

    /// Registers the sink receiving speaking/silent edges.
    ///
    /// Edges are transition-triggered: `true` fires once when speech is
    /// confirmed, `false` once when silence is confirmed or on `stop()`
    /// while speaking.
    pub fn on_activity(&mut self, sink: impl FnMut(bool) + Send + 'static) {
        self.activity_sink = Some(Box::new(sink));
    }

    /// Required number of interleaved samples per `feed` call.
    pub fn required_frame_len(&self) -> usize {
        self.frame_samples * self.channels as usize
    }

    /// Whether the classifier currently accepts frames.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current debounced speaking state.
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Resets all counters and the speaking flag, then starts accepting
    /// frames.
    pub fn start(&mut self) {
        self.speaking = false;
        self.speech_frames = 0;
        self.silence_frames = 0;
        self.running = true;
        tracing::debug!(
            frame_len = self.required_frame_len(),
            channels = self.channels,
            "voice activity classifier started"
        );
    }

    /// Stops accepting frames.
    ///
    /// If speech was in progress, one final `false` edge is fired first so
    /// the activity sink never observes an unterminated speaking period.
    pub fn stop(&mut self) {
        if self.speaking {
            if let Some(sink) = self.activity_sink.as_mut() {
                sink(false);
            }
        }
        self.running = false;
        self.speaking = false;
        self.speech_frames = 0;
        self.silence_frames = 0;
        tracing::debug!("voice activity classifier stopped");
    }

    /// Consumes one frame of interleaved samples.
    ///
    /// Silently ignores frames while stopped or before a data sink is
    /// registered. Frames of the wrong length are dropped with a warning;
    /// losing a frame is preferable to interrupting the audio path.
    pub fn feed(&mut self, frame: Vec<i16>) {
        if !self.running || self.data_sink.is_none() {
            return;
        }
        if frame.len() != self.required_frame_len() {
            tracing::warn!(
                expected = self.required_frame_len(),
                actual = frame.len(),
                "dropping audio frame of unexpected length"
            );
            return;
        }

        self.classify(&frame);

        let forwarded = if self.channels == 2 {
            downmix_to_mono(&frame)
        } else {
            frame
        };
        if let Some(sink) = self.data_sink.as_mut() {
            sink(forwarded);
        }
    }

    /// Updates the hysteresis counters from the frame's peak level and fires
    /// an activity edge when a transition is confirmed.
    fn classify(&mut self, frame: &[i16]) {
        let stride = if self.channels == 2 { 2 } else { 1 };
        let peak = metering::peak_level(frame, stride);

        if peak >= self.config.speech_peak_threshold {
            self.speech_frames += 1;
            self.silence_frames = 0;
        } else if peak <= self.config.silence_peak_threshold {
            self.silence_frames += 1;
            self.speech_frames = 0;
        }
        // Peaks inside the dead zone leave both counters unchanged.

        if !self.speaking && self.speech_frames >= self.config.speech_frames_to_trigger {
            self.speaking = true;
            if let Some(sink) = self.activity_sink.as_mut() {
                sink(true);
            }
        } else if self.speaking && self.silence_frames >= self.config.silence_frames_to_trigger {
            self.speaking = false;
            if let Some(sink) = self.activity_sink.as_mut() {
                sink(false);
            }
        }
    }
}

/// Extracts the designated channel from an interleaved stereo frame.
fn downmix_to_mono(frame: &[i16]) -> Vec<i16> {
    frame.iter().step_by(2).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    fn classifier() -> VoiceActivityClassifier {
        VoiceActivityClassifier::new(VadConfig::default(), 16_000, 1)
    }

    /// Classifier with edge capture wired in, returning the edge log.
    fn classifier_with_edges() -> (VoiceActivityClassifier, Arc<Mutex<Vec<bool>>>) {
        let mut vad = classifier();
        let edges = Arc::new(Mutex::new(Vec::new()));
        let edge_log = edges.clone();
        vad.on_data(|_| {});
        vad.on_activity(move |speaking| edge_log.lock().push(speaking));
        vad.start();
        (vad, edges)
    }

    fn frame_with_peak(len: usize, peak: i16) -> Vec<i16> {
        let mut frame = vec![0i16; len];
        if let Some(s) = frame.get_mut(len / 2) {
            *s = peak;
        }
        frame
    }

    #[test]
    fn test_required_frame_len_mono() {
        let vad = VoiceActivityClassifier::new(VadConfig::default(), 16_000, 1);
        // 30ms at 16kHz
        assert_eq!(vad.required_frame_len(), 480);
    }

    #[test]
    fn test_required_frame_len_stereo_doubles() {
        let vad = VoiceActivityClassifier::new(VadConfig::default(), 16_000, 2);
        assert_eq!(vad.required_frame_len(), 960);
    }

    #[test]
    fn test_unsupported_channel_count_falls_back_to_mono() {
        let vad = VoiceActivityClassifier::new(VadConfig::default(), 16_000, 6);
        assert_eq!(vad.required_frame_len(), 480);
    }

    #[test]
    fn test_feed_while_stopped_is_noop() {
        let mut vad = classifier();
        let delivered = Arc::new(AtomicUsize::new(0));
        let count = delivered.clone();
        vad.on_data(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });

        // Never started.
        vad.feed(frame_with_peak(480, 5000));
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        assert!(!vad.is_running());
    }

    #[test]
    fn test_feed_without_data_sink_is_noop() {
        let (_, edges) = {
            let mut vad = classifier();
            let edges = Arc::new(Mutex::new(Vec::new()));
            let edge_log = edges.clone();
            vad.on_activity(move |speaking| edge_log.lock().push(speaking));
            vad.start();
            for _ in 0..5 {
                vad.feed(frame_with_peak(480, 5000));
            }
            (vad, edges)
        };
        assert!(edges.lock().is_empty());
    }

    #[test]
    fn test_wrong_length_frame_dropped() {
        let (mut vad, edges) = classifier_with_edges();
        for _ in 0..10 {
            vad.feed(frame_with_peak(100, 5000));
        }
        // Dropped frames must not advance the hysteresis counters.
        assert!(edges.lock().is_empty());
        assert!(!vad.is_speaking());
    }

    #[test]
    fn test_speaking_edge_fires_exactly_once() {
        let (mut vad, edges) = classifier_with_edges();

        // Default trigger is 2 frames; feed 6 loud frames.
        for _ in 0..6 {
            vad.feed(frame_with_peak(480, 5000));
        }

        assert_eq!(*edges.lock(), vec![true]);
        assert!(vad.is_speaking());
    }

    #[test]
    fn test_dead_zone_changes_neither_counter() {
        let (mut vad, edges) = classifier_with_edges();

        // One loud frame, then a long run inside the dead zone (700..1200
        // exclusive). The speech counter must neither advance to a trigger
        // nor reset, so a single follow-up loud frame completes the edge.
        vad.feed(frame_with_peak(480, 1500));
        for _ in 0..50 {
            vad.feed(frame_with_peak(480, 1000));
        }
        assert!(edges.lock().is_empty());

        vad.feed(frame_with_peak(480, 1500));
        assert_eq!(*edges.lock(), vec![true]);
    }

    #[test]
    fn test_asymmetric_triggers() {
        // 2 frames at 1500 confirm speech; 9 frames at 300 must not yet
        // confirm silence; the 10th completes the false edge.
        let (mut vad, edges) = classifier_with_edges();

        vad.feed(frame_with_peak(480, 1500));
        vad.feed(frame_with_peak(480, 1500));
        assert_eq!(*edges.lock(), vec![true]);

        for _ in 0..9 {
            vad.feed(frame_with_peak(480, 300));
        }
        assert_eq!(*edges.lock(), vec![true]);

        vad.feed(frame_with_peak(480, 300));
        assert_eq!(*edges.lock(), vec![true, false]);
        assert!(!vad.is_speaking());
    }

    #[test]
    fn test_silence_resets_speech_counter() {
        let (mut vad, edges) = classifier_with_edges();

        // Alternating loud/quiet frames never accumulate the 2-frame run.
        for _ in 0..10 {
            vad.feed(frame_with_peak(480, 1500));
            vad.feed(frame_with_peak(480, 300));
        }
        assert!(edges.lock().is_empty());
    }

    #[test]
    fn test_stop_while_speaking_fires_terminal_false_edge() {
        let (mut vad, edges) = classifier_with_edges();

        vad.feed(frame_with_peak(480, 1500));
        vad.feed(frame_with_peak(480, 1500));
        assert_eq!(*edges.lock(), vec![true]);

        vad.stop();
        assert_eq!(*edges.lock(), vec![true, false]);
        assert!(!vad.is_running());
        assert!(!vad.is_speaking());
    }

    #[test]
    fn test_stop_while_silent_fires_no_edge() {
        let (mut vad, edges) = classifier_with_edges();
        vad.feed(frame_with_peak(480, 100));
        vad.stop();
        assert!(edges.lock().is_empty());
    }

    #[test]
    fn test_start_resets_state() {
        let (mut vad, _) = classifier_with_edges();
        vad.feed(frame_with_peak(480, 1500));
        vad.feed(frame_with_peak(480, 1500));
        assert!(vad.is_speaking());

        vad.stop();
        vad.start();
        assert!(vad.is_running());
        assert!(!vad.is_speaking());
    }

    #[test]
    fn test_stereo_downmix_takes_left_channel() {
        let mut vad = VoiceActivityClassifier::new(VadConfig::default(), 16_000, 2);
        let forwarded = Arc::new(Mutex::new(Vec::new()));
        let out = forwarded.clone();
        vad.on_data(move |frame| out.lock().push(frame));
        vad.start();

        // Interleaved [L0, R0, L1, R1, ...] with L = i, R = -i.
        let frame: Vec<i16> = (0..480)
            .flat_map(|i| [i as i16, -(i as i16)])
            .collect();
        vad.feed(frame);

        let forwarded = forwarded.lock();
        assert_eq!(forwarded.len(), 1);
        let mono = &forwarded[0];
        assert_eq!(mono.len(), 480);
        let expected: Vec<i16> = (0..480).map(|i| i as i16).collect();
        assert_eq!(*mono, expected);
    }

    #[test]
    fn test_mono_frame_forwarded_unmodified() {
        let mut vad = classifier();
        let forwarded = Arc::new(Mutex::new(Vec::new()));
        let out = forwarded.clone();
        vad.on_data(move |frame| out.lock().push(frame));
        vad.start();

        let frame: Vec<i16> = (0..480).map(|i| (i % 7) as i16).collect();
        vad.feed(frame.clone());

        assert_eq!(*forwarded.lock(), vec![frame]);
    }

    #[test]
    fn test_stereo_peak_uses_designated_channel_only() {
        let mut vad = VoiceActivityClassifier::new(VadConfig::default(), 16_000, 2);
        let edges = Arc::new(Mutex::new(Vec::new()));
        let edge_log = edges.clone();
        vad.on_data(|_| {});
        vad.on_activity(move |speaking| edge_log.lock().push(speaking));
        vad.start();

        // Loud right channel, quiet left channel: no speech confirmed.
        let frame: Vec<i16> = (0..480).flat_map(|_| [100i16, 20_000]).collect();
        for _ in 0..5 {
            vad.feed(frame.clone());
        }
        assert!(edges.lock().is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = VadConfig::default();
        assert_eq!(config.speech_peak_threshold, 1200);
        assert_eq!(config.silence_peak_threshold, 700);
        assert_eq!(config.speech_frames_to_trigger, 2);
        assert_eq!(config.silence_frames_to_trigger, 10);
        assert_eq!(config.frame_duration_ms, 30);
    }
}
