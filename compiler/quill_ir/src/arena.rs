//! Flat storage for expression trees.

use crate::{ExprId, ExprKind, ExprRange, MapEntry, MapEntryRange, Span};

fn to_u32(n: usize, what: &str) -> u32 {
    u32::try_from(n).unwrap_or_else(|_| panic!("too many {what} in one template"))
}

fn to_u16(n: usize, what: &str) -> u16 {
    u16::try_from(n).unwrap_or_else(|_| panic!("too many {what} in one list"))
}

/// Struct-of-arrays arena: `kinds` and `spans` are parallel, indexed by [`ExprId`].
///
/// Built once by the parser and read-only afterwards, so one arena can be
/// evaluated by any number of threads at once.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    spans: Vec<Span>,
    expr_lists: Vec<ExprId>,
    map_entries: Vec<MapEntry>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for a source of `source_len` bytes (roughly one node per 4 bytes).
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 4;
        ExprArena {
            kinds: Vec::with_capacity(estimated),
            spans: Vec::with_capacity(estimated),
            expr_lists: Vec::new(),
            map_entries: Vec::new(),
        }
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "expressions"));
        self.kinds.push(kind);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.kinds.get(id.index()).copied().unwrap_or(ExprKind::Error)
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.spans.get(id.index()).copied().unwrap_or(Span::DUMMY)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn alloc_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        if ids.is_empty() {
            return ExprRange::EMPTY;
        }
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, to_u16(ids.len(), "expressions"))
    }

    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        self.expr_lists.get(start..start + range.len()).unwrap_or(&[])
    }

    pub fn alloc_map_entries(&mut self, entries: &[MapEntry]) -> MapEntryRange {
        if entries.is_empty() {
            return MapEntryRange::EMPTY;
        }
        let start = to_u32(self.map_entries.len(), "map entries");
        self.map_entries.extend_from_slice(entries);
        MapEntryRange {
            start,
            len: to_u16(entries.len(), "map entries"),
        }
    }

    pub fn get_map_entries(&self, range: MapEntryRange) -> &[MapEntry] {
        let start = range.start as usize;
        self.map_entries
            .get(start..start + range.len())
            .unwrap_or(&[])
    }
}
