//! JSON-lines frame input
//!
//! One object per line:
//! `{"width":640,"height":480,"detections":[[{"id":0,"x":320.0,"y":80.0}, ...]]}`

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use posc_core::{FrameShape, Keypoint, LandmarkFrame, PoscError, PoscResult};

#[derive(Debug, Deserialize)]
struct FrameLine {
    width: u32,
    height: u32,
    #[serde(default)]
    detections: Vec<Vec<Keypoint>>,
}

/// Parse one input line into a frame
pub fn parse_frame(line: &str) -> PoscResult<LandmarkFrame> {
    let raw: FrameLine =
        serde_json::from_str(line).map_err(|e| PoscError::Source(e.to_string()))?;
    let shape = FrameShape::new(raw.width, raw.height)?;
    Ok(LandmarkFrame {
        shape,
        detections: raw.detections.into_iter().filter(|d| !d.is_empty()).collect(),
    })
}

/// Counters for the reader task
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadStats {
    pub lines: u64,
    pub frames: u64,
    pub rejected: u64,
}

/// Forward frames from `reader` until EOF or until the pipeline hangs up.
/// Malformed lines are logged and skipped.
pub async fn forward_frames<R>(reader: R, tx: mpsc::Sender<LandmarkFrame>) -> PoscResult<ReadStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReadStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| PoscError::Source(e.to_string()))?
    {
        stats.lines += 1;
        if line.trim().is_empty() {
            continue;
        }
        match parse_frame(&line) {
            Ok(frame) => {
                if tx.send(frame).await.is_err() {
                    return Err(PoscError::SourceClosed);
                }
                stats.frames += 1;
            }
            Err(e) => {
                stats.rejected += 1;
                tracing::warn!(line = stats.lines, error = %e, "skipping input line");
            }
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_line() {
        let frame = parse_frame(
            r#"{"width":640,"height":480,"detections":[[{"id":0,"x":320.0,"y":80.0},{"id":11,"x":370.0,"y":140.0,"visibility":0.9}]]}"#,
        )
        .unwrap();
        assert_eq!(frame.shape.width(), 640);
        assert_eq!(frame.primary().len(), 2);
        assert_eq!(frame.primary()[1].visibility, Some(0.9));
    }

    #[test]
    fn test_parse_no_detections() {
        let frame = parse_frame(r#"{"width":640,"height":480,"detections":[[]]}"#).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.detection_count(), 0);

        let frame = parse_frame(r#"{"width":640,"height":480}"#).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_frame("not json"), Err(PoscError::Source(_))));
        assert!(matches!(
            parse_frame(r#"{"width":0,"height":480}"#),
            Err(PoscError::InvalidFrameShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_forward_skips_bad_lines() {
        let input = concat!(
            r#"{"width":640,"height":480}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"width":640,"height":480,"detections":[[{"id":0,"x":1.0,"y":2.0}]]}"#,
            "\n",
        );
        let (tx, mut rx) = mpsc::channel(8);

        let stats = forward_frames(input.as_bytes(), tx).await.unwrap();
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.rejected, 1);

        assert!(rx.recv().await.unwrap().is_empty());
        assert_eq!(rx.recv().await.unwrap().primary().len(), 1);
        assert!(rx.recv().await.is_none());
    }
}
