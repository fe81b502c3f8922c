//! Level text format
//!
//! ```text
//! ##  REFERENCES  ##
//! player_start, 64, 272
//!
//! ##  DECORATIONS  ##
//! lamp, 100, 200
//!
//! ##  WALLS  ##
//! stone, 0, 320, 640, 32
//!
//! ##  GROUND  ##
//! dirt, 0, 288
//! ```
//!
//! Bad lines are logged with their file and line number and skipped.

use std::fmt;

use glam::IVec2;

use super::catalog;
use crate::error::EngineError;
use crate::geom::Rect;

const SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    References,
    Decorations,
    Walls,
    Ground,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::References,
        Section::Decorations,
        Section::Walls,
        Section::Ground,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Section::References => "##  REFERENCES  ##",
            Section::Decorations => "##  DECORATIONS  ##",
            Section::Walls => "##  WALLS  ##",
            Section::Ground => "##  GROUND  ##",
        }
    }

    fn from_header(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.header() == line)
    }
}

/// One entity line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Reference { ref_id: String, pos: IVec2 },
    Decoration { id: String, pos: IVec2 },
    Wall { anim: String, rect: Rect },
    Ground { id: String, pos: IVec2 },
}

impl Record {
    pub fn section(&self) -> Section {
        match self {
            Record::Reference { .. } => Section::References,
            Record::Decoration { .. } => Section::Decorations,
            Record::Wall { .. } => Section::Walls,
            Record::Ground { .. } => Section::Ground,
        }
    }

    fn parse(section: Section, line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
        let expected = if section == Section::Walls { 5 } else { 3 };
        if fields.len() != expected {
            return Err(format!("expected {} fields, found {}", expected, fields.len()));
        }
        let id = fields[0];
        if id.is_empty() {
            return Err("empty id".to_string());
        }
        let nums = fields[1..]
            .iter()
            .map(|f| {
                f.parse::<i32>()
                    .map_err(|_| format!("`{f}` is not an integer"))
            })
            .collect::<Result<Vec<i32>, String>>()?;
        let pos = IVec2::new(nums[0], nums[1]);

        let record = match section {
            Section::References => Record::Reference {
                ref_id: id.to_string(),
                pos,
            },
            Section::Decorations => {
                if catalog::decoration(id).is_none() {
                    return Err(format!("unknown decoration id `{id}`"));
                }
                Record::Decoration {
                    id: id.to_string(),
                    pos,
                }
            }
            Section::Ground => {
                if catalog::ground(id).is_none() {
                    return Err(format!("unknown ground id `{id}`"));
                }
                Record::Ground {
                    id: id.to_string(),
                    pos,
                }
            }
            Section::Walls => {
                let (w, h) = (nums[2], nums[3]);
                if w <= 0 || h <= 0 {
                    return Err(format!("wall size {w}x{h} is not positive"));
                }
                Record::Wall {
                    anim: id.to_string(),
                    rect: Rect::new(pos.x, pos.y, w, h),
                }
            }
        };
        Ok(record)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Reference { ref_id: id, pos }
            | Record::Decoration { id, pos }
            | Record::Ground { id, pos } => write!(f, "{}, {}, {}", id, pos.x, pos.y),
            Record::Wall { anim, rect } => {
                write!(f, "{}, {}, {}, {}, {}", anim, rect.x, rect.y, rect.w, rect.h)
            }
        }
    }
}

/// Parsed contents of a level file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFile {
    pub records: Vec<Record>,
}

impl LevelFile {
    /// Parse level text. `file` only names the source in log lines.
    pub fn parse(text: &str, file: &str) -> Self {
        let mut records = Vec::new();
        let mut section = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(s) = Section::from_header(line) {
                section = Some(s);
                continue;
            }
            if line.starts_with('#') {
                log::info!("{}:{}: skipping comment", file, index + 1);
                continue;
            }
            let parsed = match section {
                Some(s) => Record::parse(s, line),
                None => Err("record before any section header".to_string()),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => {
                    let err = EngineError::InvalidLevelLine {
                        file: file.to_string(),
                        line: index + 1,
                        reason,
                    };
                    log::warn!("{}", err);
                }
            }
        }
        Self { records }
    }

    pub fn count(&self, section: Section) -> usize {
        self.records.iter().filter(|r| r.section() == section).count()
    }

    /// Canonical text: every section in order, records sorted, a blank line
    /// between sections
    pub fn to_text(&self) -> String {
        let blocks: Vec<String> = Section::ALL
            .into_iter()
            .map(|section| {
                let mut lines: Vec<String> = self
                    .records
                    .iter()
                    .filter(|r| r.section() == section)
                    .map(Record::to_string)
                    .collect();
                lines.sort();
                let mut block = section.header().to_string();
                for line in lines {
                    block.push('\n');
                    block.push_str(&line);
                }
                block
            })
            .collect();
        let mut text = blocks.join("\n\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
##  WALLS  ##
stone, 0, 320, 640, 32
metal, 100, 100, 64, 64

##  REFERENCES  ##
player_start, 64, 272
# old spawn, 10, 10

##  DECORATIONS  ##
lamp, 300, 200
";

    #[test]
    fn test_parse_sections() {
        let level = LevelFile::parse(SAMPLE, "sample.txt");
        assert_eq!(level.count(Section::Walls), 2);
        assert_eq!(level.count(Section::References), 1);
        assert_eq!(level.count(Section::Decorations), 1);
        assert_eq!(level.count(Section::Ground), 0);
        assert_eq!(
            level.records[0],
            Record::Wall {
                anim: "stone".to_string(),
                rect: Rect::new(0, 320, 640, 32)
            }
        );
    }

    #[test]
    fn test_bad_lines_are_skipped() {
        let text = "\
stray, 1, 2
##  WALLS  ##
stone, 0, 0, 32
stone, 0, 0, x, 32
stone, 0, 0, 0, 32
stone, 0, 0, 32, 32
##  DECORATIONS  ##
dragon, 5, 5
lamp, 5, 5
##  GROUND  ##
lamp, 0, 0
dirt, -32, 64
";
        let level = LevelFile::parse(text, "bad.txt");
        assert_eq!(level.records.len(), 3);
        assert_eq!(
            level.records[2],
            Record::Ground {
                id: "dirt".to_string(),
                pos: IVec2::new(-32, 64)
            }
        );
    }

    #[test]
    fn test_canonical_text() {
        let level = LevelFile::parse(SAMPLE, "sample.txt");
        let expected = "\
##  REFERENCES  ##
player_start, 64, 272

##  DECORATIONS  ##
lamp, 300, 200

##  WALLS  ##
metal, 100, 100, 64, 64
stone, 0, 320, 640, 32

##  GROUND  ##
";
        assert_eq!(level.to_text(), expected);
        assert_eq!(LevelFile::parse(expected, "canon.txt").to_text(), expected);
    }
}
