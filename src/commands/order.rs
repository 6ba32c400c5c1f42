use crate::{
    cli::OrderArgs,
    core::chromosome::ChromosomeOrderer,
    io::{vcf_reader::VcfReader, vcf_writer::VcfWriter},
    utils::util::Result,
};

pub fn order(args: OrderArgs) -> Result<()> {
    let mut document = VcfReader::read(&args.input)?;

    ChromosomeOrderer::new()
        .with_columns(&args.chrom_column, &args.pos_column)
        .with_unknown_contigs(args.output_args.unknown_contigs)
        .order(document.table_mut())?;

    let written = VcfWriter::new()
        .with_compression(args.output_args.compression_level)
        .write(&document, &args.output)?;
    log::info!(
        "Wrote {} ordered rows to {}",
        document.table().len(),
        written.display()
    );
    Ok(())
}
