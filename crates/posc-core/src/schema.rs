//! Landmark schemas and the parameter channels derived from them
//!
//! Body mode follows the 33-point body model (indices 0..=32), hand mode
//! the 21-point hand model. The body channel order below is the positional
//! order used on the wire (`/0` .. `/10`).

use crate::ChannelId;

/// Number of landmarks in the body model
pub const BODY_LANDMARK_COUNT: usize = 33;

/// Number of landmarks per hand
pub const HAND_LANDMARK_COUNT: usize = 21;

// ============================================================================
// BODY LANDMARK INDICES
// ============================================================================

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

// ============================================================================
// BODY PARTS (gating groups)
// ============================================================================

/// Named group of landmarks that is gated as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    /// All parts in emission order
    pub fn all() -> &'static [BodyPart] {
        &[
            BodyPart::Nose,
            BodyPart::LeftArm,
            BodyPart::RightArm,
            BodyPart::LeftLeg,
            BodyPart::RightLeg,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftArm => "left_arm",
            BodyPart::RightArm => "right_arm",
            BodyPart::LeftLeg => "left_leg",
            BodyPart::RightLeg => "right_leg",
        }
    }

    /// Named OSC address (`/nose`, `/left_arm`, ...)
    pub fn address(&self) -> &'static str {
        match self {
            BodyPart::Nose => "/nose",
            BodyPart::LeftArm => "/left_arm",
            BodyPart::RightArm => "/right_arm",
            BodyPart::LeftLeg => "/left_leg",
            BodyPart::RightLeg => "/right_leg",
        }
    }

    /// Landmarks that must all be detected for the part to be valid
    pub fn landmarks(&self) -> &'static [usize] {
        match self {
            BodyPart::Nose => &[NOSE],
            BodyPart::LeftArm => &[LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST],
            BodyPart::RightArm => &[RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST],
            BodyPart::LeftLeg => &[LEFT_HIP, LEFT_KNEE, LEFT_ANKLE],
            BodyPart::RightLeg => &[RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE],
        }
    }

    /// The two channels carried in this part's named message
    pub fn channels(&self) -> [BodyChannel; 2] {
        match self {
            BodyPart::Nose => [BodyChannel::NoseX, BodyChannel::NoseY],
            BodyPart::LeftArm => [BodyChannel::LeftShoulder, BodyChannel::LeftElbow],
            BodyPart::RightArm => [BodyChannel::RightShoulder, BodyChannel::RightElbow],
            BodyPart::LeftLeg => [BodyChannel::LeftHip, BodyChannel::LeftKnee],
            BodyPart::RightLeg => [BodyChannel::RightHip, BodyChannel::RightKnee],
        }
    }

    /// Landmarks the part's named message depends on: its own landmarks
    /// plus every input of its channels, which may lie on the other side
    pub fn required_landmarks(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.landmarks().to_vec();
        for ch in self.channels() {
            ids.extend(ch.source().landmarks());
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Index into `BodyPart::all()`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ============================================================================
// BODY CHANNELS
// ============================================================================

/// How a channel's raw value is derived from the keypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSource {
    /// X coordinate of a landmark
    X(usize),
    /// Y coordinate of a landmark
    Y(usize),
    /// Body area from shoulders and hips
    BodyArea,
    /// Angle at `vertex` between rays to `first` and `last`
    Angle {
        first: usize,
        vertex: usize,
        last: usize,
    },
}

impl ChannelSource {
    /// Landmarks the value depends on
    pub fn landmarks(&self) -> Vec<usize> {
        match *self {
            ChannelSource::X(i) | ChannelSource::Y(i) => vec![i],
            ChannelSource::BodyArea => {
                vec![LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP]
            }
            ChannelSource::Angle {
                first,
                vertex,
                last,
            } => vec![first, vertex, last],
        }
    }
}

/// Fixed-body parameter channel, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyChannel {
    NoseX,
    NoseY,
    BodyArea,
    RightShoulder,
    RightElbow,
    LeftShoulder,
    LeftElbow,
    RightHip,
    RightKnee,
    LeftHip,
    LeftKnee,
}

impl BodyChannel {
    /// Number of fixed-body channels
    pub const COUNT: usize = 11;

    /// All channels in wire order
    pub fn all() -> &'static [BodyChannel] {
        &[
            BodyChannel::NoseX,
            BodyChannel::NoseY,
            BodyChannel::BodyArea,
            BodyChannel::RightShoulder,
            BodyChannel::RightElbow,
            BodyChannel::LeftShoulder,
            BodyChannel::LeftElbow,
            BodyChannel::RightHip,
            BodyChannel::RightKnee,
            BodyChannel::LeftHip,
            BodyChannel::LeftKnee,
        ]
    }

    pub fn id(&self) -> ChannelId {
        ChannelId(*self as usize)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BodyChannel::NoseX => "nose_x",
            BodyChannel::NoseY => "nose_y",
            BodyChannel::BodyArea => "body_area",
            BodyChannel::RightShoulder => "right_shoulder",
            BodyChannel::RightElbow => "right_elbow",
            BodyChannel::LeftShoulder => "left_shoulder",
            BodyChannel::LeftElbow => "left_elbow",
            BodyChannel::RightHip => "right_hip",
            BodyChannel::RightKnee => "right_knee",
            BodyChannel::LeftHip => "left_hip",
            BodyChannel::LeftKnee => "left_knee",
        }
    }

    pub fn source(&self) -> ChannelSource {
        let angle = |first, vertex, last| ChannelSource::Angle {
            first,
            vertex,
            last,
        };
        match self {
            BodyChannel::NoseX => ChannelSource::X(NOSE),
            BodyChannel::NoseY => ChannelSource::Y(NOSE),
            BodyChannel::BodyArea => ChannelSource::BodyArea,
            BodyChannel::RightShoulder => angle(LEFT_SHOULDER, RIGHT_SHOULDER, RIGHT_ELBOW),
            BodyChannel::RightElbow => angle(RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
            BodyChannel::LeftShoulder => angle(RIGHT_SHOULDER, LEFT_SHOULDER, LEFT_ELBOW),
            BodyChannel::LeftElbow => angle(LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
            BodyChannel::RightHip => angle(LEFT_HIP, RIGHT_HIP, RIGHT_KNEE),
            BodyChannel::RightKnee => angle(RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
            BodyChannel::LeftHip => angle(RIGHT_HIP, LEFT_HIP, LEFT_KNEE),
            BodyChannel::LeftKnee => angle(LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
        }
    }

    /// Joint angle in degrees
    pub fn is_angle(&self) -> bool {
        matches!(self.source(), ChannelSource::Angle { .. })
    }
}

/// Channel id of landmark `landmark` on hand `hand` in hand mode
pub fn hand_channel(hand: usize, landmark: usize) -> ChannelId {
    ChannelId(landmark + hand * HAND_LANDMARK_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_channel_order() {
        assert_eq!(BodyChannel::all().len(), BodyChannel::COUNT);
        for (i, ch) in BodyChannel::all().iter().enumerate() {
            assert_eq!(ch.id(), ChannelId(i));
        }
    }

    #[test]
    fn test_part_channels_share_side() {
        // Every angle in a part's message has its vertex inside that part
        for part in BodyPart::all() {
            for ch in part.channels() {
                if let ChannelSource::Angle { vertex, .. } = ch.source() {
                    assert!(part.landmarks().contains(&vertex), "{:?} {:?}", part, ch);
                }
            }
        }
    }

    #[test]
    fn test_landmarks_in_range() {
        for ch in BodyChannel::all() {
            assert!(ch.source().landmarks().iter().all(|&i| i < BODY_LANDMARK_COUNT));
        }
        for part in BodyPart::all() {
            assert!(part.landmarks().iter().all(|&i| i < BODY_LANDMARK_COUNT));
        }
    }

    #[test]
    fn test_required_landmarks_cross_sides() {
        assert_eq!(BodyPart::Nose.required_landmarks(), vec![NOSE]);
        assert_eq!(
            BodyPart::LeftArm.required_landmarks(),
            vec![LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_ELBOW, LEFT_WRIST]
        );
        assert_eq!(
            BodyPart::RightLeg.required_landmarks(),
            vec![LEFT_HIP, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE]
        );
        for part in BodyPart::all() {
            let required = part.required_landmarks();
            assert!(part.landmarks().iter().all(|id| required.contains(id)));
        }
    }

    #[test]
    fn test_angle_channels() {
        let angles = BodyChannel::all().iter().filter(|c| c.is_angle()).count();
        assert_eq!(angles, 8);
        assert!(!BodyChannel::BodyArea.is_angle());
    }

    #[test]
    fn test_hand_channel_ids() {
        assert_eq!(hand_channel(0, 0), ChannelId(0));
        assert_eq!(hand_channel(0, 20), ChannelId(20));
        assert_eq!(hand_channel(1, 0), ChannelId(21));
        assert_eq!(hand_channel(1, 20), ChannelId(41));
    }

    #[test]
    fn test_part_index_matches_all() {
        for (i, part) in BodyPart::all().iter().enumerate() {
            assert_eq!(part.index(), i);
        }
    }
}
