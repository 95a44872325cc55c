//! GDAL metadata XML parsing
//!
//! GDAL-produced GeoTIFFs carry an XML document in tag 42112 whose
//! `<Item>` elements describe bands, for example:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="DESCRIPTION" sample="0" role="description">VV</Item>
//!   <Item name="DESCRIPTION" sample="1" role="description">VH</Item>
//! </GDALMetadata>
//! ```
//!
//! Band descriptions become the column names of the output table; bands
//! without a description fall back to `band_<n>`.

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;

/// Extracts per-band descriptions from GDALMetadata XML
///
/// # Arguments
/// * `xml` - Raw contents of the GDAL_METADATA tag
/// * `band_count` - Number of bands in the image
///
/// # Returns
/// One name per band, `band_<n>` where no description is present
pub fn band_names_from_metadata(xml: &str, band_count: usize) -> Vec<String> {
    let mut names: Vec<Option<String>> = vec![None; band_count];

    let mut xml_reader = XmlReader::from_str(xml);
    xml_reader.config_mut().trim_text(true);

    let mut pending_sample: Option<usize> = None;
    let mut buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"Item" => {
                let mut is_description = false;
                let mut sample: Option<usize> = None;

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"name" if value == "DESCRIPTION" => is_description = true,
                        b"sample" => sample = value.parse().ok(),
                        _ => {}
                    }
                }

                pending_sample = if is_description { sample } else { None };
            }
            Ok(Event::Text(t)) => {
                if let Some(sample) = pending_sample {
                    if sample < band_count {
                        let text = t.unescape().unwrap_or_default().to_string();
                        if !text.is_empty() {
                            names[sample] = Some(text);
                        }
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"Item" => {
                pending_sample = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("GDALMetadata XML parse stopped: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| name.unwrap_or_else(|| format!("band_{}", i + 1)))
        .collect()
}

/// Default band names when no metadata is available
pub fn default_band_names(band_count: usize) -> Vec<String> {
    (1..=band_count).map(|i| format!("band_{}", i)).collect()
}
