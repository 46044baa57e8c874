//! Fade schedule for background + vocals mixes.

use ffgate_media::filters::vocals_mix_graph;

/// Seconds the vocals are delayed behind the background.
pub const VOCALS_DELAY_SECS: f64 = 10.0;
/// Background fade-in length from t=0.
pub const FADE_IN_SECS: f64 = 5.0;
/// Fade-out length of the mixed result.
pub const FADE_OUT_SECS: f64 = 15.0;

/// Timings of a vocals mix, all in seconds from the start of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSchedule {
    pub delay_start: f64,
    pub fade_in: f64,
    pub fade_out_start: f64,
    pub fade_out: f64,
    pub total_duration: f64,
}

impl FadeSchedule {
    /// Derive the schedule from the probed vocals duration.
    pub fn for_vocals(vocals_duration: f64) -> Self {
        let delay_start = VOCALS_DELAY_SECS;
        let fade_out_start = delay_start + vocals_duration;
        Self {
            delay_start,
            fade_in: FADE_IN_SECS,
            fade_out_start,
            fade_out: FADE_OUT_SECS,
            total_duration: fade_out_start + FADE_OUT_SECS,
        }
    }

    /// Filter graph realizing this schedule; background is input 0, vocals input 1.
    pub fn mix_graph(&self) -> String {
        vocals_mix_graph(
            self.delay_start,
            self.fade_in,
            self.fade_out_start,
            self.fade_out,
            self.total_duration,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_for_vocals() {
        let schedule = FadeSchedule::for_vocals(12.5);
        assert_eq!(schedule.delay_start, 10.0);
        assert_eq!(schedule.fade_out_start, 22.5);
        assert_eq!(schedule.total_duration, 37.5);
    }

    #[test]
    fn test_schedule_graph_uses_timings() {
        let graph = FadeSchedule::for_vocals(60.0).mix_graph();
        assert!(graph.contains("adelay=10000"));
        assert!(graph.contains("afade=t=out:st=70:d=15"));
        assert!(graph.contains("atrim=0:85"));
    }
}
