use manos_plate_core::Range;

/// The two surfaces the link controller owns inside the shared panel stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPanel {
    Actions,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// What a panel should be anchored to.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionTarget {
    Run(Range),
    Selection(Vec<Range>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelPosition {
    pub target: PositionTarget,
    pub bounds: Option<Bounds>,
}

/// Externally owned, ordered stack of floating panels. The last member is
/// the visible one.
pub trait PanelStack {
    fn contains(&self, panel: LinkPanel) -> bool;
    fn add(&mut self, panel: LinkPanel, position: PanelPosition);
    fn remove(&mut self, panel: LinkPanel);
    fn is_visible(&self, panel: LinkPanel) -> bool;
    fn update_position(&mut self, position: PanelPosition);
    /// Moves the link panels above any foreign members.
    fn bring_to_front(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackEntry {
    Link {
        panel: LinkPanel,
        position: PanelPosition,
    },
    Foreign(String),
}

#[derive(Debug, Clone, Default)]
pub struct VecPanelStack {
    entries: Vec<StackEntry>,
}

impl VecPanelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn push_foreign(&mut self, name: impl Into<String>) {
        self.entries.push(StackEntry::Foreign(name.into()));
    }

    pub fn remove_foreign(&mut self, name: &str) {
        self.entries
            .retain(|entry| !matches!(entry, StackEntry::Foreign(n) if n == name));
    }

    pub fn position_of(&self, panel: LinkPanel) -> Option<&PanelPosition> {
        self.entries.iter().find_map(|entry| match entry {
            StackEntry::Link { panel: p, position } if *p == panel => Some(position),
            _ => None,
        })
    }

    pub fn visible(&self) -> Option<&StackEntry> {
        self.entries.last()
    }
}

impl PanelStack for VecPanelStack {
    fn contains(&self, panel: LinkPanel) -> bool {
        self.position_of(panel).is_some()
    }

    fn add(&mut self, panel: LinkPanel, position: PanelPosition) {
        if self.contains(panel) {
            return;
        }
        self.entries.push(StackEntry::Link { panel, position });
    }

    fn remove(&mut self, panel: LinkPanel) {
        self.entries
            .retain(|entry| !matches!(entry, StackEntry::Link { panel: p, .. } if *p == panel));
    }

    fn is_visible(&self, panel: LinkPanel) -> bool {
        matches!(self.entries.last(), Some(StackEntry::Link { panel: p, .. }) if *p == panel)
    }

    fn update_position(&mut self, position: PanelPosition) {
        for entry in &mut self.entries {
            if let StackEntry::Link { position: p, .. } = entry {
                *p = position.clone();
            }
        }
    }

    fn bring_to_front(&mut self) {
        let (link, foreign): (Vec<StackEntry>, Vec<StackEntry>) = self
            .entries
            .drain(..)
            .partition(|entry| matches!(entry, StackEntry::Link { .. }));
        self.entries = foreign;
        self.entries.extend(link);
    }
}
