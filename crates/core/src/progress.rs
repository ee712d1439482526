//! Season progress arithmetic and the candle bar.

/// Glyph for an act already performed.
pub const LIT_GLYPH: &str = "\u{1f525}";
/// Glyph for an act still to come.
pub const UNLIT_GLYPH: &str = "\u{1f56f}\u{fe0f}";

/// Progress toward the season goal after a given act.
///
/// Pure data; building it never fails and identical inputs always produce
/// identical output. The bar always carries exactly `goal` glyphs, so an
/// act index past the goal saturates instead of overflowing the bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub act_number: i64,
    pub lit: i64,
    pub unlit: i64,
    pub remaining: i64,
}

impl Progress {
    /// Progress after act `act_number` (1-based) toward `goal` (>= 1).
    pub fn for_act(act_number: i64, goal: i64) -> Self {
        let lit = act_number.min(goal);
        let unlit = (goal - lit).max(0);
        let remaining = (goal - act_number).max(0);
        Self { act_number, lit, unlit, remaining }
    }

    /// Lit glyphs followed by unlit glyphs, one per act in the goal.
    pub fn bar(&self) -> String {
        let mut bar = String::new();
        bar.push_str(&LIT_GLYPH.repeat(self.lit.max(0) as usize));
        bar.push_str(&UNLIT_GLYPH.repeat(self.unlit.max(0) as usize));
        bar
    }
}
