use crate::{
    constants::{
        AUTOSOME_COUNT, DEFAULT_CHROM_COLUMN, DEFAULT_POS_COLUMN, RANK_MT, RANK_X, RANK_Y,
    },
    core::table::{Cell, Row, VariantTable},
    error::VarlabelError,
    utils::util::{format_number_with_commas, Result},
};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Rank of a chromosome name in the fixed order 1..22, X, Y, MT.
pub fn chromosome_rank(chrom: &str) -> Option<u32> {
    match chrom {
        "X" => Some(RANK_X),
        "Y" => Some(RANK_Y),
        "MT" => Some(RANK_MT),
        _ => {
            let rank = chrom.parse::<u32>().ok()?;
            let canonical = rank.to_string() == chrom;
            (canonical && (1..=AUTOSOME_COUNT).contains(&rank)).then_some(rank)
        }
    }
}

/// What to do with contigs outside 1..22, X, Y, MT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownContigPolicy {
    #[default]
    Reject,
    /// Sort after MT, grouped by name, then by position.
    RankLast,
}

impl FromStr for UnknownContigPolicy {
    type Err = VarlabelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reject" => Ok(Self::Reject),
            "last" => Ok(Self::RankLast),
            _ => Err(crate::varlabel_error!(
                "Invalid unknown contig policy: {s}. Must be one of reject, last."
            )),
        }
    }
}

impl fmt::Display for UnknownContigPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::RankLast => write!(f, "last"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ContigRank {
    Known(u32),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    contig: ContigRank,
    pos: i64,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.contig
            .cmp(&other.contig)
            .then_with(|| self.pos.cmp(&other.pos))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stable sort of table rows by chromosome rank, then integer position.
#[derive(Debug, Clone)]
pub struct ChromosomeOrderer {
    chrom_column: String,
    pos_column: String,
    unknown_contigs: UnknownContigPolicy,
}

impl Default for ChromosomeOrderer {
    fn default() -> Self {
        Self {
            chrom_column: DEFAULT_CHROM_COLUMN.to_string(),
            pos_column: DEFAULT_POS_COLUMN.to_string(),
            unknown_contigs: UnknownContigPolicy::default(),
        }
    }
}

impl ChromosomeOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, chrom_column: &str, pos_column: &str) -> Self {
        self.chrom_column = chrom_column.to_string();
        self.pos_column = pos_column.to_string();
        self
    }

    pub fn with_unknown_contigs(mut self, policy: UnknownContigPolicy) -> Self {
        self.unknown_contigs = policy;
        self
    }

    /// Sorts `table` in place. On error the table is left as it was.
    pub fn order(&self, table: &mut VariantTable) -> Result<()> {
        let keys = self.sort_keys(table)?;
        let rows = std::mem::take(table.rows_mut());
        let mut keyed: Vec<(SortKey, Row)> = keys.into_iter().zip(rows).collect();
        // sort_by is stable, equal keys keep their input order
        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        *table.rows_mut() = keyed.into_iter().map(|(_, row)| row).collect();
        log::debug!(
            "Ordered {} rows by {}/{}",
            format_number_with_commas(table.len()),
            self.chrom_column,
            self.pos_column
        );
        Ok(())
    }

    pub fn sort_keys(&self, table: &VariantTable) -> Result<Vec<SortKey>> {
        let chrom_idx = table.schema().require(&self.chrom_column)?;
        let pos_idx = table.schema().require(&self.pos_column)?;
        table
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let contig = self.contig_rank(&row.cells()[chrom_idx], row_idx)?;
                let pos = position(&row.cells()[pos_idx], row_idx)?;
                Ok(SortKey { contig, pos })
            })
            .collect()
    }

    fn contig_rank(&self, cell: &Cell, row_idx: usize) -> Result<ContigRank> {
        let chrom = cell.to_string();
        match (chromosome_rank(&chrom), self.unknown_contigs) {
            (Some(rank), _) => Ok(ContigRank::Known(rank)),
            (None, UnknownContigPolicy::RankLast) => Ok(ContigRank::Unknown(chrom)),
            (None, UnknownContigPolicy::Reject) => Err(VarlabelError::InvalidChromosome {
                value: chrom,
                row: row_idx,
            }),
        }
    }
}

fn position(cell: &Cell, row_idx: usize) -> Result<i64> {
    match cell {
        Cell::Integer(pos) => Ok(*pos),
        Cell::Text(raw) => raw.parse::<i64>().map_err(|error| {
            VarlabelError::parse(format!(
                "Position '{raw}' in row {row_idx} is not an integer: {error}"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{Column, Schema};

    fn table_from(records: &[(&str, i64, &str)]) -> VariantTable {
        let schema = Schema::new(vec![
            Column::text("#CHROM"),
            Column::integer("POS"),
            Column::text("ID"),
        ])
        .unwrap();
        let rows = records
            .iter()
            .map(|(chrom, pos, id)| Row::new(vec![(*chrom).into(), (*pos).into(), (*id).into()]))
            .collect();
        VariantTable::from_rows(schema, rows).unwrap()
    }

    fn column(table: &VariantTable, name: &str) -> Vec<String> {
        let idx = table.schema().index_of(name).unwrap();
        table.iter().map(|row| row.cells()[idx].to_string()).collect()
    }

    fn all_contigs() -> Vec<String> {
        let mut contigs: Vec<String> = (1..=22).map(|n| n.to_string()).collect();
        contigs.extend(["X", "Y", "MT"].map(String::from));
        contigs
    }

    #[test]
    fn test_chromosome_rank() {
        assert_eq!(chromosome_rank("1"), Some(1));
        assert_eq!(chromosome_rank("22"), Some(22));
        assert_eq!(chromosome_rank("X"), Some(23));
        assert_eq!(chromosome_rank("Y"), Some(24));
        assert_eq!(chromosome_rank("MT"), Some(25));
        assert_eq!(chromosome_rank("0"), None);
        assert_eq!(chromosome_rank("23"), None);
        assert_eq!(chromosome_rank("01"), None);
        assert_eq!(chromosome_rank("chr1"), None);
        assert_eq!(chromosome_rank("M"), None);
    }

    #[test]
    fn order_yields_full_contig_sequence() {
        let expected = all_contigs();
        // deterministic shuffle: interleave from both ends
        let mut shuffled = Vec::new();
        let (mut lo, mut hi) = (0usize, expected.len() - 1);
        while lo <= hi {
            shuffled.push(expected[hi].clone());
            if lo != hi {
                shuffled.push(expected[lo].clone());
            }
            lo += 1;
            hi -= 1;
        }
        let records: Vec<(&str, i64, &str)> =
            shuffled.iter().map(|c| (c.as_str(), 1, "v")).collect();
        let mut table = table_from(&records);

        ChromosomeOrderer::new().order(&mut table).unwrap();
        assert_eq!(column(&table, "#CHROM"), expected);
    }

    #[test]
    fn order_sorts_positions_within_contig() {
        let mut table = table_from(&[
            ("2", 500, "a"),
            ("1", 300, "b"),
            ("2", 100, "c"),
            ("1", 20, "d"),
            ("X", 5, "e"),
        ]);
        ChromosomeOrderer::new().order(&mut table).unwrap();
        assert_eq!(column(&table, "ID"), vec!["d", "b", "c", "a", "e"]);
    }

    #[test]
    fn order_is_stable_for_equal_keys() {
        let mut table = table_from(&[
            ("3", 100, "first"),
            ("1", 1, "other"),
            ("3", 100, "second"),
            ("3", 100, "third"),
        ]);
        ChromosomeOrderer::new().order(&mut table).unwrap();
        assert_eq!(
            column(&table, "ID"),
            vec!["other", "first", "second", "third"]
        );
    }

    #[test]
    fn order_compares_positions_numerically() {
        let schema = Schema::new(vec![Column::text("#CHROM"), Column::text("POS")]).unwrap();
        let rows = ["1000", "99", "100"]
            .iter()
            .map(|pos| Row::new(vec!["1".into(), (*pos).into()]))
            .collect();
        let mut table = VariantTable::from_rows(schema, rows).unwrap();
        ChromosomeOrderer::new().order(&mut table).unwrap();
        assert_eq!(column(&table, "POS"), vec!["99", "100", "1000"]);
    }

    #[test]
    fn order_ranks_integer_chrom_column() {
        let schema = Schema::new(vec![Column::integer("#CHROM"), Column::integer("POS")]).unwrap();
        let rows = [(10, 1), (2, 1), (1, 5)]
            .iter()
            .map(|(chrom, pos)| Row::new(vec![Cell::Integer(*chrom), Cell::Integer(*pos)]))
            .collect();
        let mut table = VariantTable::from_rows(schema, rows).unwrap();
        ChromosomeOrderer::new().order(&mut table).unwrap();
        assert_eq!(column(&table, "#CHROM"), vec!["1", "2", "10"]);
    }

    #[test]
    fn order_rejects_unknown_contig_by_default() {
        let original = table_from(&[("2", 1, "a"), ("chrUn", 5, "b"), ("1", 1, "c")]);
        let mut table = original.clone();
        let result = ChromosomeOrderer::new().order(&mut table);
        match result {
            Err(VarlabelError::InvalidChromosome { value, row }) => {
                assert_eq!(value, "chrUn");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidChromosome, got {other:?}"),
        }
        assert_eq!(table, original);
    }

    #[test]
    fn order_ranks_unknown_contigs_last_when_allowed() {
        let mut table = table_from(&[
            ("GL000192.1", 10, "a"),
            ("MT", 1, "b"),
            ("GL000191.1", 50, "c"),
            ("GL000192.1", 5, "d"),
            ("1", 1, "e"),
        ]);
        ChromosomeOrderer::new()
            .with_unknown_contigs(UnknownContigPolicy::RankLast)
            .order(&mut table)
            .unwrap();
        assert_eq!(column(&table, "ID"), vec!["e", "b", "c", "d", "a"]);
    }

    #[test]
    fn order_reports_non_integer_position() {
        let schema = Schema::new(vec![Column::text("#CHROM"), Column::text("POS")]).unwrap();
        let rows = vec![
            Row::new(vec!["1".into(), "10".into()]),
            Row::new(vec!["1".into(), "ten".into()]),
        ];
        let mut table = VariantTable::from_rows(schema, rows).unwrap();
        let result = ChromosomeOrderer::new().order(&mut table);
        assert!(matches!(result, Err(VarlabelError::Parse { .. })));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn order_requires_configured_columns() {
        let mut table = table_from(&[("1", 1, "a")]);
        let result = ChromosomeOrderer::new()
            .with_columns("%CHROM", "%POS")
            .order(&mut table);
        assert!(matches!(result, Err(VarlabelError::Schema { .. })));
    }

    #[test]
    fn unknown_contig_policy_from_str() {
        assert_eq!(
            "reject".parse::<UnknownContigPolicy>().unwrap(),
            UnknownContigPolicy::Reject
        );
        assert_eq!(
            "last".parse::<UnknownContigPolicy>().unwrap(),
            UnknownContigPolicy::RankLast
        );
        assert!("first".parse::<UnknownContigPolicy>().is_err());
    }
}
