//! Data model for the elements a beam span connects.
//!
//! These structures capture the drawing information the geometry engine
//! needs from the score: what kind of element it is, its notated duration,
//! where the layout pass placed it, and its stem sub-object.
//!
//! Drawing coordinates grow upward: a higher pitch has a larger `drawing_y`.

use serde::{Deserialize, Serialize};

/// Index of an element inside the arena of a [`crate::BeamSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub(crate) usize);

/// Stem direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

impl StemDirection {
    /// +1 for up-stems, -1 for down-stems.
    pub fn sign(self) -> i32 {
        match self {
            StemDirection::Up => 1,
            StemDirection::Down => -1,
        }
    }
}

/// Notated duration class.
///
/// The discriminant is the duration code: shorter values have larger codes,
/// so the "shortest" duration of a group is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Duration {
    #[serde(rename = "maxima")]
    Maxima = -1,
    #[serde(rename = "long")]
    Long = 0,
    #[serde(rename = "breve")]
    Breve = 1,
    #[serde(rename = "whole")]
    Whole = 2,
    #[serde(rename = "half")]
    Half = 3,
    #[serde(rename = "quarter")]
    Quarter = 4,
    #[serde(rename = "eighth")]
    Eighth = 5,
    #[serde(rename = "16th")]
    Sixteenth = 6,
    #[serde(rename = "32nd")]
    ThirtySecond = 7,
    #[serde(rename = "64th")]
    SixtyFourth = 8,
    #[serde(rename = "128th")]
    OneHundredTwentyEighth = 9,
    #[serde(rename = "256th")]
    TwoHundredFiftySixth = 10,
}

impl Duration {
    /// Ordinal duration code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Notehead glyph drawn for this duration.
    pub fn notehead(self) -> Glyph {
        match self {
            Duration::Maxima | Duration::Long | Duration::Breve | Duration::Whole => {
                Glyph::NoteheadWhole
            }
            Duration::Half => Glyph::NoteheadHalf,
            _ => Glyph::NoteheadBlack,
        }
    }
}

/// Glyphs whose metrics the engine looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Glyph {
    NoteheadBlack,
    NoteheadHalf,
    NoteheadWhole,
}

/// A point in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Classification tag of a layer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Note,
    Chord,
    Rest,
    Space,
    Clef,
    /// Beam container; its children are part of the span content.
    Beam,
    /// Tuplet container.
    Tuplet,
    /// Editorial wrapper (app, choice, ...); not a layer element itself.
    Editorial,
    /// Verse, syllable or other text markup; not a layer element.
    Annotation,
}

impl ElementKind {
    /// Whether elements of this kind sit in the layer's time line.
    pub fn is_layer_element(self) -> bool {
        !matches!(self, ElementKind::Editorial | ElementKind::Annotation)
    }

    /// Whether this kind carries a stem sub-object and can be beamed.
    pub fn is_stemmed(self) -> bool {
        matches!(self, ElementKind::Note | ElementKind::Chord)
    }

    /// Whether an element of `child` kind may be attached below this one.
    pub fn accepts(self, child: ElementKind) -> bool {
        match self {
            ElementKind::Beam | ElementKind::Tuplet | ElementKind::Editorial => {
                accepted_by_span(child)
            }
            ElementKind::Chord => matches!(child, ElementKind::Note | ElementKind::Annotation),
            ElementKind::Note => child == ElementKind::Annotation,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Note => "note",
            ElementKind::Chord => "chord",
            ElementKind::Rest => "rest",
            ElementKind::Space => "space",
            ElementKind::Clef => "clef",
            ElementKind::Beam => "beam",
            ElementKind::Tuplet => "tuplet",
            ElementKind::Editorial => "editorial",
            ElementKind::Annotation => "annotation",
        }
    }
}

/// Kinds a beam span accepts as direct children.
pub(crate) fn accepted_by_span(child: ElementKind) -> bool {
    !matches!(child, ElementKind::Annotation)
}

/// Stem sub-object of a note or chord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stem {
    /// Direction encoded in the score, if any
    #[serde(default)]
    pub dir: Option<StemDirection>,
    /// Direction chosen by the engine
    #[serde(default)]
    pub drawing_dir: Option<StemDirection>,
    /// Horizontal offset from the element's drawing x
    #[serde(default)]
    pub drawing_x_rel: i32,
    /// Vertical offset of the stem base from the element's drawing y
    #[serde(default)]
    pub drawing_y_rel: i32,
    /// Signed length from the stem base to the beam (negative for up-stems)
    #[serde(default)]
    pub drawing_len: i32,
}

impl Stem {
    /// A stem with an explicit direction from the score.
    pub fn with_dir(dir: StemDirection) -> Self {
        Self {
            dir: Some(dir),
            ..Self::default()
        }
    }
}

/// A note, chord, rest or structural element inside a beam span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerElement {
    /// Classification tag
    pub kind: ElementKind,
    /// Notated duration (None for elements without a duration)
    #[serde(default)]
    pub dur: Option<Duration>,
    /// Horizontal drawing position from the layout pass
    #[serde(default)]
    pub drawing_x: i32,
    /// Vertical drawing position from the layout pass
    #[serde(default)]
    pub drawing_y: i32,
    /// Whether this is a grace note
    #[serde(default)]
    pub grace: bool,
    /// Whether this element is drawn at cue size
    #[serde(default)]
    pub cue_size: bool,
    /// Number of secondary beams broken at this element
    #[serde(default)]
    pub breaksec: Option<u8>,
    /// Stem sub-object (None for rests, or notes drawn without a stem)
    #[serde(default)]
    pub stem: Option<Stem>,
    /// Stem direction applied by the engine
    #[serde(default, skip_deserializing)]
    pub drawing_stem_dir: Option<StemDirection>,
    #[serde(skip)]
    pub(crate) parent: Option<ElementId>,
    #[serde(skip)]
    pub(crate) children: Vec<ElementId>,
    /// Index of this element's coordinate record in its span, if any.
    #[serde(skip)]
    pub(crate) coord: Option<usize>,
}

impl LayerElement {
    /// A bare element of the given kind.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            dur: None,
            drawing_x: 0,
            drawing_y: 0,
            grace: false,
            cue_size: false,
            breaksec: None,
            stem: None,
            drawing_stem_dir: None,
            parent: None,
            children: Vec::new(),
            coord: None,
        }
    }

    /// A stemmed note at the given drawing position.
    pub fn note(dur: Duration, x: i32, y: i32) -> Self {
        Self {
            dur: Some(dur),
            drawing_x: x,
            drawing_y: y,
            stem: Some(Stem::default()),
            ..Self::new(ElementKind::Note)
        }
    }

    /// A note meant to be added to a chord; it has no stem of its own.
    pub fn chord_tone(dur: Duration, x: i32, y: i32) -> Self {
        Self {
            dur: Some(dur),
            drawing_x: x,
            drawing_y: y,
            ..Self::new(ElementKind::Note)
        }
    }

    /// A stemmed chord; its tones are added with [`crate::BeamSpan::add_child_to`].
    pub fn chord(dur: Duration, x: i32, y: i32) -> Self {
        Self {
            dur: Some(dur),
            drawing_x: x,
            drawing_y: y,
            stem: Some(Stem::default()),
            ..Self::new(ElementKind::Chord)
        }
    }

    pub fn rest(dur: Duration, x: i32, y: i32) -> Self {
        Self {
            dur: Some(dur),
            drawing_x: x,
            drawing_y: y,
            ..Self::new(ElementKind::Rest)
        }
    }

    pub fn space(dur: Duration, x: i32) -> Self {
        Self {
            dur: Some(dur),
            drawing_x: x,
            ..Self::new(ElementKind::Space)
        }
    }

    pub fn with_grace(mut self) -> Self {
        self.grace = true;
        self
    }

    pub fn with_cue_size(mut self) -> Self {
        self.cue_size = true;
        self
    }

    /// Set an explicit stem direction, creating the stem if needed.
    pub fn with_stem_dir(mut self, dir: StemDirection) -> Self {
        self.stem.get_or_insert_with(Stem::default).dir = Some(dir);
        self
    }

    pub fn with_breaksec(mut self, count: u8) -> Self {
        self.breaksec = Some(count);
        self
    }

    pub fn without_stem(mut self) -> Self {
        self.stem = None;
        self
    }

    /// Explicit stem direction encoded on the stem sub-object.
    pub fn explicit_stem_dir(&self) -> Option<StemDirection> {
        self.stem.as_ref().and_then(|s| s.dir)
    }

    pub fn is_note(&self) -> bool {
        self.kind == ElementKind::Note
    }

    pub fn is_chord(&self) -> bool {
        self.kind == ElementKind::Chord
    }
}

/// Vertical placement of the staff the span is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffContext {
    /// Drawing y of the top staff line
    pub drawing_y: i32,
    /// Staff size in percent (100 = normal)
    #[serde(default = "default_staff_size")]
    pub size: i32,
}

fn default_staff_size() -> i32 {
    100
}

impl StaffContext {
    pub fn new(drawing_y: i32) -> Self {
        Self {
            drawing_y,
            size: default_staff_size(),
        }
    }
}

/// Context the enclosing layer provides for a geometry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    pub staff: StaffContext,
    /// Default stem direction of the layer (voice), if it defines one
    #[serde(default)]
    pub layer_stem_dir: Option<StemDirection>,
}

impl SpanContext {
    pub fn new(staff: StaffContext) -> Self {
        Self {
            staff,
            layer_stem_dir: None,
        }
    }

    pub fn with_layer_stem_dir(mut self, dir: StemDirection) -> Self {
        self.layer_stem_dir = Some(dir);
        self
    }
}
