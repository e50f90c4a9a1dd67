use crate::{LineID, Style};

/// The styled area attached to a crosswalk line. The borders are regular lines starting
/// from the enter points under the crosswalk's ends; they shape its sides.
#[derive(Clone, Debug)]
pub struct Crosswalk {
    pub line: LineID,
    pub style: Style,
    pub left_border: Option<LineID>,
    pub right_border: Option<LineID>,
}

impl Crosswalk {
    pub fn uses_border(&self, line: LineID) -> bool {
        self.left_border == Some(line) || self.right_border == Some(line)
    }

    /// Forgets `line` as a border, returns how many references were cleared
    pub(crate) fn clear_border(&mut self, line: LineID) -> usize {
        let mut n = 0;
        if self.left_border == Some(line) {
            self.left_border = None;
            n += 1;
        }
        if self.right_border == Some(line) {
            self.right_border = None;
            n += 1;
        }
        n
    }
}
