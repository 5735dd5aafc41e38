//! Post-serialisation compaction with lopdf.
//!
//! pdfium writes whatever objects it accumulated while the document was
//! edited, including orphans left behind by regenerated content streams.
//! Rasterised output is already several times larger than the vector
//! original, so a prune + compress pass is run over the saved bytes.

use lopdf::Document;
use tracing::{debug, warn};

/// Prune unreferenced objects, drop empty streams, renumber and compress.
pub fn compact(bytes: &[u8]) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::load_mem(bytes)?;

    let pruned = doc.prune_objects();
    let empty = doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();

    let mut buffer = Vec::with_capacity(bytes.len());
    doc.save_to(&mut buffer)?;

    debug!(
        "Compacted PDF: {} → {} bytes ({} pruned objects, {} empty streams)",
        bytes.len(),
        buffer.len(),
        pruned.len(),
        empty.len()
    );
    Ok(buffer)
}

/// Run [`compact`], keeping the original bytes if lopdf cannot reparse them.
///
/// The input is a valid PDF the engine just produced; failing to shrink it is
/// not a reason to throw the conversion away.
pub fn compact_or_keep(bytes: Vec<u8>) -> Vec<u8> {
    match compact(&bytes) {
        Ok(compacted) if compacted.len() <= bytes.len() => compacted,
        Ok(compacted) => {
            debug!(
                "Compaction grew output ({} → {} bytes); keeping original",
                bytes.len(),
                compacted.len()
            );
            bytes
        }
        Err(e) => {
            warn!("Skipping compaction, lopdf could not reparse output: {}", e);
            bytes
        }
    }
}
