//! Genomic unit annotations
//!
//! Genes and variants are annotated with values from third-party genomic
//! datasets. The backend keys annotation routes by unit kind, so callers can
//! hand this module a bare unit string and let it classify gene symbols
//! versus HGVS-notated variants.

use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::requests::{RequestError, RequestResult, Requests};

const ANNOTATE_ROOT: &str = "/rosalution/api/annotate";

/// What kind of genomic unit a string names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomicUnitKind {
    Gene,
    HgvsVariant,
}

/// Classify a genomic unit string. Anything carrying an HGVS-style
/// `reference:type.position` body is a variant; everything else is treated
/// as a gene symbol.
pub fn classify(unit: &str) -> GenomicUnitKind {
    static HGVS: OnceLock<regex::Regex> = OnceLock::new();
    let hgvs = HGVS.get_or_init(|| {
        regex::Regex::new(r"^\S+:[cgmnpr]\.\S+").expect("HGVS pattern is valid")
    });
    if hgvs.is_match(unit) {
        GenomicUnitKind::HgvsVariant
    } else {
        GenomicUnitKind::Gene
    }
}

fn decode(value: Value, context: &str) -> RequestResult<Map<String, Value>> {
    serde_json::from_value(value).map_err(|source| RequestError::Decode {
        url: context.to_string(),
        source,
    })
}

/// Fetch the dataset annotations for a gene
pub async fn for_gene(requests: &dyn Requests, gene: &str) -> RequestResult<Map<String, Value>> {
    let path = format!("{}/gene/{}", ANNOTATE_ROOT, gene);
    let value = requests.get(&path).await?;
    decode(value, &path)
}

/// Fetch the dataset annotations for an HGVS variant
pub async fn for_variant(
    requests: &dyn Requests,
    variant: &str,
) -> RequestResult<Map<String, Value>> {
    let path = format!("{}/hgvsVariant/{}", ANNOTATE_ROOT, variant);
    let value = requests.get(&path).await?;
    decode(value, &path)
}

/// Fetch annotations for a unit string, classifying it first
pub async fn annotate(requests: &dyn Requests, unit: &str) -> RequestResult<Map<String, Value>> {
    match classify(unit) {
        GenomicUnitKind::Gene => for_gene(requests, unit).await,
        GenomicUnitKind::HgvsVariant => for_variant(requests, unit).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::testing::FakeRequests;
    use serde_json::json;

    #[test]
    fn test_classify_gene_symbols() {
        assert_eq!(classify("VMA21"), GenomicUnitKind::Gene);
        assert_eq!(classify("PEX10"), GenomicUnitKind::Gene);
    }

    #[test]
    fn test_classify_hgvs_variants() {
        assert_eq!(
            classify("NM_001017980.3:c.164G>T"),
            GenomicUnitKind::HgvsVariant
        );
        assert_eq!(
            classify("NC_000001.11:g.2406823C>T"),
            GenomicUnitKind::HgvsVariant
        );
    }

    #[tokio::test]
    async fn test_gene_annotations_path() {
        let fake = FakeRequests::new();
        fake.respond_with(json!({"Gene Summary": "VMA21 encodes...", "OMIM": "310440"}));

        let annotations = for_gene(&fake, "VMA21").await.unwrap();
        assert_eq!(annotations.get("OMIM").unwrap(), "310440");
        assert_eq!(fake.calls()[0].path, "/rosalution/api/annotate/gene/VMA21");
    }

    #[tokio::test]
    async fn test_annotate_dispatches_on_unit_kind() {
        let fake = FakeRequests::new();
        fake.respond_with(json!({"ClinVar": "Pathogenic"}));

        annotate(&fake, "NM_001017980.3:c.164G>T").await.unwrap();
        assert_eq!(
            fake.calls()[0].path,
            "/rosalution/api/annotate/hgvsVariant/NM_001017980.3:c.164G>T"
        );
    }
}
