//! Cross-reference index over every decoded tag row.
//!
//! The index is built once, before any file is annotated, because a usage in
//! one file may point at a definition in any other. It owns every record for
//! the lifetime of the run and hands out borrowed views:
//!
//! - per symbol, the link target for its definitions and its references,
//! - per file, the records that file owns and the lines the index knows about.
//!
//! A symbol with a single location links straight to that line. A symbol
//! defined in several places, or used on more than one line, links to a
//! grouped page instead.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::XrefResult;
use crate::models::{DefinitionRecord, FileId, LinkTarget, ReferenceRecord};
use crate::payload::{self, Malformed, Payload, PayloadKind};

/// Accumulates decoded rows from the definition and reference stores.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    definitions: Vec<DefinitionRecord>,
    references: Vec<ReferenceRecord>,
    skipped: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one store row and keep it if it is a record.
    ///
    /// Malformed rows are counted and dropped. Returns the skip reason, if any.
    pub fn push_row(
        &mut self,
        kind: PayloadKind,
        key: &str,
        dat: &str,
    ) -> XrefResult<Option<Malformed>> {
        match payload::decode(kind, key, dat)? {
            Payload::Definition(record) => self.definitions.push(record),
            Payload::Reference(record) => self.references.push(record),
            Payload::Malformed(reason) => {
                self.skipped += 1;
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    pub fn push_definition(&mut self, record: DefinitionRecord) {
        self.definitions.push(record);
    }

    pub fn push_reference(&mut self, record: ReferenceRecord) {
        self.references.push(record);
    }

    pub fn finish(self) -> XrefIndex {
        XrefIndex::new(self.definitions, self.references, self.skipped)
    }
}

/// Read-only cross-reference index.
#[derive(Debug, Default)]
pub struct XrefIndex {
    definitions: Vec<DefinitionRecord>,
    references: Vec<ReferenceRecord>,
    definitions_by_symbol: BTreeMap<String, Vec<usize>>,
    references_by_symbol: BTreeMap<String, Vec<usize>>,
    definitions_by_file: HashMap<FileId, Vec<usize>>,
    references_by_file: HashMap<FileId, Vec<usize>>,
    lines_by_file: HashMap<FileId, BTreeSet<u32>>,
    skipped_rows: usize,
}

impl XrefIndex {
    fn new(
        definitions: Vec<DefinitionRecord>,
        references: Vec<ReferenceRecord>,
        skipped_rows: usize,
    ) -> Self {
        let mut index = XrefIndex {
            skipped_rows,
            ..Default::default()
        };

        for (i, def) in definitions.iter().enumerate() {
            index
                .definitions_by_symbol
                .entry(def.symbol.clone())
                .or_default()
                .push(i);
            index.definitions_by_file.entry(def.file).or_default().push(i);
            index
                .lines_by_file
                .entry(def.file)
                .or_default()
                .insert(def.line);
        }

        for (i, rev) in references.iter().enumerate() {
            index
                .references_by_symbol
                .entry(rev.symbol.clone())
                .or_default()
                .push(i);
            index.references_by_file.entry(rev.file).or_default().push(i);
            index
                .lines_by_file
                .entry(rev.file)
                .or_default()
                .extend(rev.lines.iter().copied());
        }

        index.definitions = definitions;
        index.references = references;
        index
    }

    /// Where a link to the definition of `symbol` should point.
    pub fn definitions_of(&self, symbol: &str) -> Option<LinkTarget> {
        let ids = self.definitions_by_symbol.get(symbol)?;
        match ids.as_slice() {
            [] => None,
            [only] => {
                let def = &self.definitions[*only];
                Some(LinkTarget::Line {
                    file: def.file,
                    line: def.line,
                })
            }
            _ => Some(LinkTarget::DefinitionPage(symbol.to_string())),
        }
    }

    /// Where a link to the usages of `symbol` should point.
    pub fn references_of(&self, symbol: &str) -> Option<LinkTarget> {
        let ids = self.references_by_symbol.get(symbol)?;
        if self.is_reference_group(ids) {
            return Some(LinkTarget::ReferencePage(symbol.to_string()));
        }
        let rev = &self.references[*ids.first()?];
        let line = *rev.lines.first()?;
        Some(LinkTarget::Line {
            file: rev.file,
            line,
        })
    }

    fn is_reference_group(&self, ids: &[usize]) -> bool {
        match ids {
            [] => false,
            [only] => self.references[*only].lines.len() > 1,
            _ => true,
        }
    }

    /// Every definition of `symbol`, in store order.
    pub fn definition_records<'a>(
        &'a self,
        symbol: &str,
    ) -> impl Iterator<Item = &'a DefinitionRecord> + 'a {
        self.definitions_by_symbol
            .get(symbol)
            .into_iter()
            .flatten()
            .map(move |&i| &self.definitions[i])
    }

    /// Every reference record of `symbol`, in store order.
    pub fn reference_records<'a>(
        &'a self,
        symbol: &str,
    ) -> impl Iterator<Item = &'a ReferenceRecord> + 'a {
        self.references_by_symbol
            .get(symbol)
            .into_iter()
            .flatten()
            .map(move |&i| &self.references[i])
    }

    /// Definitions declared in `file`.
    pub fn definitions_in(&self, file: FileId) -> impl Iterator<Item = &DefinitionRecord> + '_ {
        self.definitions_by_file
            .get(&file)
            .into_iter()
            .flatten()
            .map(move |&i| &self.definitions[i])
    }

    /// References recorded for `file`.
    pub fn references_in(&self, file: FileId) -> impl Iterator<Item = &ReferenceRecord> + '_ {
        self.references_by_file
            .get(&file)
            .into_iter()
            .flatten()
            .map(move |&i| &self.references[i])
    }

    /// Definition and usage lines of `file`, or `None` if the index has none.
    pub fn lines_in(&self, file: FileId) -> Option<&BTreeSet<u32>> {
        self.lines_by_file.get(&file)
    }

    /// Symbols with more than one definition, sorted by name.
    pub fn definition_groups(&self) -> impl Iterator<Item = (&str, Vec<&DefinitionRecord>)> {
        self.definitions_by_symbol
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(move |(symbol, ids)| {
                let records = ids.iter().map(|&i| &self.definitions[i]).collect();
                (symbol.as_str(), records)
            })
    }

    /// Symbols used in several files or on several lines, sorted by name.
    pub fn reference_groups(&self) -> impl Iterator<Item = (&str, Vec<&ReferenceRecord>)> {
        self.references_by_symbol
            .iter()
            .filter(move |(_, ids)| self.is_reference_group(ids))
            .map(move |(symbol, ids)| {
                let records = ids.iter().map(|&i| &self.references[i]).collect();
                (symbol.as_str(), records)
            })
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Total usage lines across all reference records.
    pub fn usage_line_count(&self) -> usize {
        self.references.iter().map(|r| r.lines.len()).sum()
    }

    pub fn defined_symbol_count(&self) -> usize {
        self.definitions_by_symbol.len()
    }

    pub fn referenced_symbol_count(&self) -> usize {
        self.references_by_symbol.len()
    }

    /// Store rows dropped as malformed while building.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(file: u32, symbol: &str, line: u32) -> DefinitionRecord {
        DefinitionRecord {
            file: FileId(file),
            symbol: symbol.to_string(),
            line,
            payload: format!("int {}(void)", symbol),
        }
    }

    fn rev(file: u32, symbol: &str, lines: &[u32]) -> ReferenceRecord {
        ReferenceRecord {
            file: FileId(file),
            symbol: symbol.to_string(),
            lines: lines.to_vec(),
        }
    }

    fn build(defs: Vec<DefinitionRecord>, refs: Vec<ReferenceRecord>) -> XrefIndex {
        let mut builder = IndexBuilder::new();
        defs.into_iter().for_each(|d| builder.push_definition(d));
        refs.into_iter().for_each(|r| builder.push_reference(r));
        builder.finish()
    }

    #[test]
    fn single_definition_links_to_line() {
        let index = build(vec![def(1, "run", 3)], vec![]);
        assert_eq!(
            index.definitions_of("run"),
            Some(LinkTarget::Line {
                file: FileId(1),
                line: 3
            })
        );
        assert_eq!(index.definitions_of("walk"), None);
        assert_eq!(index.definition_groups().count(), 0);
    }

    #[test]
    fn repeated_definition_links_to_group_page() {
        let index = build(vec![def(1, "init", 3), def(4, "init", 20)], vec![]);
        assert_eq!(
            index.definitions_of("init"),
            Some(LinkTarget::DefinitionPage("init".into()))
        );
        let groups: Vec<_> = index.definition_groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "init");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn reference_grouping_rules() {
        let index = build(
            vec![],
            vec![
                rev(2, "once", &[7]),
                rev(2, "twice", &[5, 9]),
                rev(2, "spread", &[4]),
                rev(3, "spread", &[8]),
            ],
        );
        assert_eq!(
            index.references_of("once"),
            Some(LinkTarget::Line {
                file: FileId(2),
                line: 7
            })
        );
        assert_eq!(
            index.references_of("twice"),
            Some(LinkTarget::ReferencePage("twice".into()))
        );
        assert_eq!(
            index.references_of("spread"),
            Some(LinkTarget::ReferencePage("spread".into()))
        );
        let names: Vec<_> = index.reference_groups().map(|(s, _)| s).collect();
        assert_eq!(names, vec!["spread", "twice"]);
    }

    #[test]
    fn per_file_views() {
        let index = build(
            vec![def(1, "run", 3), def(2, "main", 1)],
            vec![rev(2, "run", &[5, 9]), rev(1, "helper", &[3, 6])],
        );

        let in_two: Vec<_> = index.references_in(FileId(2)).collect();
        assert_eq!(in_two.len(), 1);
        assert_eq!(in_two[0].symbol, "run");

        let defs_in_one: Vec<_> = index
            .definitions_in(FileId(1))
            .map(|d| d.symbol.as_str())
            .collect();
        assert_eq!(defs_in_one, vec!["run"]);

        let lines: Vec<u32> = index.lines_in(FileId(1)).unwrap().iter().copied().collect();
        assert_eq!(lines, vec![3, 6]);
        let lines: Vec<u32> = index.lines_in(FileId(2)).unwrap().iter().copied().collect();
        assert_eq!(lines, vec![1, 5, 9]);
        assert!(index.lines_in(FileId(9)).is_none());
    }

    #[test]
    fn builder_decodes_and_skips_rows() {
        let mut builder = IndexBuilder::new();
        assert!(builder
            .push_row(PayloadKind::Definition, "run", "1 @n 3 int @n(void)")
            .unwrap()
            .is_none());
        assert!(builder
            .push_row(PayloadKind::Reference, "run", "2 @n 5,4")
            .unwrap()
            .is_none());
        assert!(builder
            .push_row(PayloadKind::Definition, " __.VERSION", " __.VERSION 6")
            .unwrap()
            .is_some());

        let index = builder.finish();
        assert_eq!(index.definition_count(), 1);
        assert_eq!(index.reference_count(), 1);
        assert_eq!(index.usage_line_count(), 2);
        assert_eq!(index.skipped_rows(), 1);
        assert_eq!(
            index.references_of("run"),
            Some(LinkTarget::ReferencePage("run".into()))
        );
    }
}
