use crate::{
    cli::MergeArgs,
    constants::{ANNOTATION_CHROM, ANNOTATION_POS},
    core::{chromosome::ChromosomeOrderer, merger::AnnotationMerger},
    io::{vcf_reader::VcfReader, vcf_writer::VcfWriter},
    utils::util::{format_number_with_commas, Result},
};

/// Labels annotation rows with clinical significance and writes them under the annotation header.
pub fn merge(args: MergeArgs) -> Result<()> {
    let mut annotation = VcfReader::read(&args.annotation)?;
    let clinical = VcfReader::read(&args.clinical)?;
    log::debug!(
        "Merging {} annotation rows with {} clinical rows",
        format_number_with_commas(annotation.table().len()),
        format_number_with_commas(clinical.table().len())
    );

    let mut merged = AnnotationMerger::new().merge(annotation.table(), clinical.table())?;
    if args.order {
        ChromosomeOrderer::new()
            .with_columns(ANNOTATION_CHROM, ANNOTATION_POS)
            .with_unknown_contigs(args.output_args.unknown_contigs)
            .order(&mut merged)?;
    }
    annotation.set_table(merged);

    let written = VcfWriter::new()
        .with_compression(args.output_args.compression_level)
        .write(&annotation, &args.output)?;
    log::info!(
        "Wrote {} labeled rows to {}",
        format_number_with_commas(annotation.table().len()),
        written.display()
    );
    Ok(())
}
