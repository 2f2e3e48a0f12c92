use crate::infra::InMemoryNominationRepository;
use clap::Args;
use nomination_engine::config::AppConfig;
use nomination_engine::error::AppError;
use nomination_engine::workflows::costsheet::{distinct_vendors, CostSheetImporter};
use nomination_engine::workflows::nomination::{
    BulkCostUpdate, CapabilityMatrix, FactorWeights, FieldUpdate, NewNomination,
    NominationRanking, NominationService, RankDimension, VendorCostEntry, VendorCostSubmission,
    VendorId,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV cost sheet with a vendor id column and one column per cost field
    pub(crate) cost_sheet: PathBuf,
    /// Project reference recorded on the nomination
    #[arg(long, default_value = "cost-sheet")]
    pub(crate) project_reference: String,
    /// Net price weight in percent (defaults to APP_DEFAULT_COST_WEIGHT)
    #[arg(long)]
    pub(crate) cost_weight: Option<f64>,
    /// Development cost weight in percent
    #[arg(long)]
    pub(crate) development_cost_weight: Option<f64>,
    /// Lead time weight in percent
    #[arg(long)]
    pub(crate) lead_time_weight: Option<f64>,
    /// Print the ranked view as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the ranking and capability matrix as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let entries = CostSheetImporter::from_path(&args.cost_sheet)?;

    let service = NominationService::new(
        Arc::new(InMemoryNominationRepository::default()),
        FactorWeights::from(&config.ranking),
    );
    let record = service.create(NewNomination {
        project_reference: args.project_reference.clone(),
        bom_item: None,
        vendors: distinct_vendors(&entries),
        baseline: None,
    })?;

    let request = BulkCostUpdate {
        vendor_cost_data: entries,
        base_data: weight_overrides(&args),
    };
    let ranking = service.bulk_update_cost_data(&record.id, &request)?;

    if args.json {
        print_json(&ranking)
    } else {
        println!(
            "Ranked {} vendor quotes from {}",
            ranking.vendors.len(),
            args.cost_sheet.display()
        );
        render_ranking(&ranking);
        Ok(())
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryNominationRepository::default());
    let service = NominationService::new(repository.clone(), FactorWeights::default());

    let record = service.create(NewNomination {
        project_reference: "PRJ-DEMO-01".to_string(),
        bom_item: Some("BRKT-118 mounting bracket".to_string()),
        vendors: ["V-ACME", "V-BOLT", "V-CAST"]
            .into_iter()
            .map(VendorId::from)
            .collect(),
        baseline: Some(
            FieldUpdate::new()
                .with("netPricePerUnit", 95.0)
                .with("developmentCost", 55.0)
                .with("leadTimeDays", 8)
                .with("paymentTerms", "net 60"),
        ),
    })?;

    let ranking = service.bulk_update_cost_data(&record.id, &demo_quotes())?;

    for (vendor, quality, delivery, on_time) in [
        ("V-ACME", 86, 78, "91.5"),
        ("V-BOLT", 74, 92, "97"),
        ("V-CAST", 81, 70, "88"),
    ] {
        service.update_vendor_rating(
            &record.id,
            &VendorId::from(vendor),
            &FieldUpdate::new()
                .with("qualityScore", quality)
                .with("deliveryScore", delivery)
                .with("onTimeDeliveryPercentage", on_time)
                .with("isApproved", true),
        )?;
    }
    let capability = service.capability_data(&record.id)?;

    if args.json {
        #[derive(Serialize)]
        struct DemoOutput<'a> {
            ranking: &'a NominationRanking,
            capability: &'a CapabilityMatrix,
        }
        return print_json(&DemoOutput {
            ranking: &ranking,
            capability: &capability,
        });
    }

    println!("Vendor nomination demo");
    println!(
        "Nomination {} for {} [{}] ({} stored)",
        record.id,
        record.project_reference,
        ranking.status.label(),
        repository.len()
    );
    render_ranking(&ranking);
    render_capability(&capability);
    Ok(())
}

fn demo_quotes() -> BulkCostUpdate {
    let quote = |vendor: &str, fields: FieldUpdate| VendorCostEntry {
        vendor_id: VendorId::from(vendor),
        nomination_id: None,
        fields,
    };

    BulkCostUpdate {
        vendor_cost_data: vec![
            quote(
                "V-ACME",
                FieldUpdate::new()
                    .with("rawMaterialCost", 52.0)
                    .with("processCost", 28.0)
                    .with("overheadsProfit", 14.0)
                    .with("packingForwardingCost", 6.0)
                    .with("netPricePerUnit", 100.0)
                    .with("developmentCost", 50.0)
                    .with("leadTimeDays", 10),
            ),
            quote(
                "V-BOLT",
                FieldUpdate::new()
                    .with("netPricePerUnit", 90.0)
                    .with("developmentCost", 60.0)
                    .with("leadTimeDays", 5)
                    .with("financialRiskPercentage", "4.5"),
            ),
            quote(
                "V-CAST",
                FieldUpdate::new()
                    .with("net_price_per_unit", 96.0)
                    .with("development_cost", 45.0),
            ),
        ],
        base_data: None,
    }
}

fn weight_overrides(args: &RankArgs) -> Option<FieldUpdate> {
    let mut patch = FieldUpdate::new();
    for (field, weight) in [
        ("cost_weight", args.cost_weight),
        ("development_cost_weight", args.development_cost_weight),
        ("lead_time_weight", args.lead_time_weight),
    ] {
        if let Some(weight) = weight {
            patch.push(field, weight);
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
    println!("{rendered}");
    Ok(())
}

fn render_ranking(ranking: &NominationRanking) {
    let weights = &ranking.weights;
    println!(
        "\nWeights: net price {:.0}% | development cost {:.0}% | lead time {:.0}%",
        weights.cost_weight, weights.development_cost_weight, weights.lead_time_weight
    );
    for warning in &ranking.warnings {
        println!("  ! {}", warning.summary());
    }

    println!("Overall ranking:");
    for submission in &ranking.vendors {
        println!(
            "  {:>4}  {:<12} total {:>7} | competency {:>6} | itemised {:>7} | {}",
            submission
                .ranking
                .overall_rank
                .map(|rank| format!("#{rank}"))
                .unwrap_or_else(|| "-".to_string()),
            submission.vendor_id.0,
            format_optional(submission.ranking.total_score),
            format_optional(submission.ranking.cost_competency_score),
            format_optional(submission.components.itemised_total()),
            dimension_summary(submission)
        );
    }
}

fn dimension_summary(submission: &VendorCostSubmission) -> String {
    RankDimension::ordered()
        .into_iter()
        .map(|dimension| {
            let value = format_optional(dimension.value_of(&submission.components));
            match submission.ranking.rank_for(dimension) {
                Some(rank) => format!("{} {} (#{rank})", dimension.label(), value),
                None => format!("{} {}", dimension.label(), value),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_capability(capability: &CapabilityMatrix) {
    println!("\nCapability matrix:");
    for row in &capability.criteria {
        let cells = row
            .cells
            .iter()
            .map(|cell| format!("{} {}", cell.vendor_id, format_optional(cell.score)))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("  {:<22} {}", row.criterion_label, cells);
    }
    for vendor in &capability.vendors {
        println!(
            "  {:<12} aggregate {:>6} | rank {}",
            vendor.vendor_id.0,
            format_optional(vendor.aggregate_score),
            vendor
                .overall_rank
                .map(|rank| rank.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_args(cost: Option<f64>, lead_time: Option<f64>) -> RankArgs {
        RankArgs {
            cost_sheet: PathBuf::from("quotes.csv"),
            project_reference: "cost-sheet".to_string(),
            cost_weight: cost,
            development_cost_weight: None,
            lead_time_weight: lead_time,
            json: false,
        }
    }

    #[test]
    fn weight_overrides_only_include_given_flags() {
        assert!(weight_overrides(&rank_args(None, None)).is_none());

        let patch = weight_overrides(&rank_args(Some(70.0), Some(0.0))).expect("patch");
        let keys: Vec<&str> = patch.keys().collect();
        assert_eq!(keys, vec!["cost_weight", "lead_time_weight"]);
    }

    #[test]
    fn demo_quotes_rank_all_three_vendors() {
        let service = NominationService::new(
            Arc::new(InMemoryNominationRepository::default()),
            FactorWeights::default(),
        );
        let record = service
            .create(NewNomination {
                project_reference: "PRJ-T".to_string(),
                bom_item: None,
                vendors: ["V-ACME", "V-BOLT", "V-CAST"]
                    .into_iter()
                    .map(VendorId::from)
                    .collect(),
                baseline: None,
            })
            .expect("created");

        let ranking = service
            .bulk_update_cost_data(&record.id, &demo_quotes())
            .expect("bulk update");

        assert!(ranking
            .vendors
            .iter()
            .all(|submission| submission.ranking.overall_rank.is_some()));
        let cast = ranking
            .vendor(&VendorId::from("V-CAST"))
            .expect("cast ranked");
        assert_eq!(cast.ranking.rank_lead_time, None);
        assert_eq!(cast.ranking.rank_development_cost, Some(1));
        assert_eq!(cast.components.itemised_total(), None);

        let acme = ranking
            .vendor(&VendorId::from("V-ACME"))
            .expect("acme ranked");
        assert_eq!(acme.components.itemised_total(), Some(100.0));
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs { json: true }).expect("demo succeeds");
    }

    #[test]
    fn optional_values_render_with_two_decimals() {
        assert_eq!(format_optional(Some(1.5)), "1.50");
        assert_eq!(format_optional(None), "-");
    }
}
