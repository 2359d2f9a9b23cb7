//! Parser for the correction-spec DSL (§6): plain UTF-8 text describing
//! per-`(family, style, weight)` kerning and advancement corrections.

use crate::error::BitfontError;
use crate::spec::charset::parse_charset;
use crate::spec::types::{
    CharCorrection, DiscretisationRange, FontCorrections, KerningEntry, SizeBracket, Spec,
};

fn corrupted(reason: impl Into<String>) -> BitfontError {
    BitfontError::CorruptedAsset {
        identity: "<correction spec>".to_string(),
        reason: reason.into(),
    }
}

fn is_top_level_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 7 && trimmed.chars().all(|c| c == '-')
}

fn is_subsection_separator(line: &str) -> bool {
    line.trim() == "--"
}

fn parse_float(s: &str, context: &str) -> Result<f64, BitfontError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| corrupted(format!("expected a number in {context}, found {s:?}")))
}

/// Parses a `[size] to [size] [at pixel density N]` header line.
fn parse_header(line: &str) -> Result<(f64, f64, Option<f64>), BitfontError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 || tokens[1] != "to" {
        return Err(corrupted(format!("malformed size-bracket header {line:?}")));
    }
    let from = parse_float(tokens[0], "size-bracket header")?;
    let to = parse_float(tokens[2], "size-bracket header")?;

    let pixel_density = if tokens.len() > 3 {
        if tokens.len() != 7 || tokens[3] != "at" || tokens[4] != "pixel" || tokens[5] != "density" {
            return Err(corrupted(format!("malformed size-bracket header {line:?}")));
        }
        Some(parse_float(tokens[6], "size-bracket header")?)
    } else {
        None
    };

    Ok((from, to, pixel_density))
}

fn is_header_line(line: &str) -> bool {
    !line.starts_with(char::is_whitespace) && line.split_whitespace().nth(1) == Some("to")
}

/// Groups a subsection's body lines (after the key name and its `-` line)
/// into `(header, entry lines)` pairs.
fn group_by_header(lines: &[&str]) -> Result<Vec<((f64, f64, Option<f64>), Vec<String>)>, BitfontError> {
    let mut groups = Vec::new();
    let mut current: Option<((f64, f64, Option<f64>), Vec<String>)> = None;

    for &raw in lines {
        if raw.trim().is_empty() {
            continue;
        }
        if is_header_line(raw) {
            if let Some(group) = current.take() {
                groups.push(group);
            }
            current = Some((parse_header(raw)?, Vec::new()));
        } else {
            let entry = raw.trim().to_string();
            match &mut current {
                Some((_, entries)) => entries.push(entry),
                None => return Err(corrupted(format!("entry {raw:?} appears before any size-bracket header"))),
            }
        }
    }
    if let Some(group) = current.take() {
        groups.push(group);
    }

    Ok(groups)
}

fn split_on_last_colon<'a>(line: &'a str, context: &str) -> Result<(&'a str, &'a str), BitfontError> {
    let idx = line
        .rfind(':')
        .ok_or_else(|| corrupted(format!("expected ':' in {context} line {line:?}")))?;
    Ok((line[..idx].trim(), line[idx + 1..].trim()))
}

fn parse_scalar_brackets(groups: &[((f64, f64, Option<f64>), Vec<String>)]) -> Result<Vec<SizeBracket<f64>>, BitfontError> {
    groups
        .iter()
        .map(|((from, to, pixel_density), entries)| {
            if entries.len() != 1 {
                return Err(corrupted(format!(
                    "expected exactly one value in size bracket {from} to {to}, found {}",
                    entries.len()
                )));
            }
            Ok(SizeBracket {
                from: *from,
                to: *to,
                pixel_density: *pixel_density,
                value: parse_float(&entries[0], "scalar size bracket")?,
            })
        })
        .collect()
}

fn parse_character_indexed_brackets(
    groups: &[((f64, f64, Option<f64>), Vec<String>)],
) -> Result<Vec<SizeBracket<Vec<CharCorrection>>>, BitfontError> {
    groups
        .iter()
        .map(|((from, to, pixel_density), entries)| {
            let value = entries
                .iter()
                .map(|line| {
                    let (chars_token, float_token) = split_on_last_colon(line, "character correction")?;
                    Ok(CharCorrection {
                        chars: parse_charset(chars_token),
                        value: parse_float(float_token, "character correction")?,
                    })
                })
                .collect::<Result<Vec<_>, BitfontError>>()?;
            Ok(SizeBracket {
                from: *from,
                to: *to,
                pixel_density: *pixel_density,
                value,
            })
        })
        .collect()
}

fn parse_kerning_brackets(
    groups: &[((f64, f64, Option<f64>), Vec<String>)],
) -> Result<Vec<SizeBracket<Vec<KerningEntry>>>, BitfontError> {
    groups
        .iter()
        .map(|((from, to, pixel_density), entries)| {
            let value = entries
                .iter()
                .map(|line| {
                    let (sets, adjustment_token) = split_on_last_colon(line, "kerning")?;
                    let set_tokens: Vec<&str> = sets.split_whitespace().collect();
                    if set_tokens.len() != 2 {
                        return Err(corrupted(format!("expected LEFTSET RIGHTSET in kerning line {line:?}")));
                    }
                    Ok(KerningEntry {
                        left: parse_charset(set_tokens[0]),
                        right: parse_charset(set_tokens[1]),
                        adjustment: parse_float(adjustment_token, "kerning")?,
                    })
                })
                .collect::<Result<Vec<_>, BitfontError>>()?;
            Ok(SizeBracket {
                from: *from,
                to: *to,
                pixel_density: *pixel_density,
                value,
            })
        })
        .collect()
}

fn parse_discretisation_brackets(
    groups: &[((f64, f64, Option<f64>), Vec<String>)],
) -> Result<Vec<SizeBracket<Vec<DiscretisationRange>>>, BitfontError> {
    groups
        .iter()
        .map(|((from, to, pixel_density), entries)| {
            let value = entries
                .iter()
                .map(|line| {
                    let (range_part, correction_token) = split_on_last_colon(line, "kerning discretisation")?;
                    let parts: Vec<&str> = range_part.splitn(2, ">= kern >").collect();
                    if parts.len() != 2 {
                        return Err(corrupted(format!(
                            "expected 'FLOAT >= kern > FLOAT' in discretisation line {line:?}"
                        )));
                    }
                    Ok(DiscretisationRange {
                        kern_le: parse_float(parts[0], "kerning discretisation")?,
                        kern_g: parse_float(parts[1], "kerning discretisation")?,
                        correction: parse_float(correction_token, "kerning discretisation")?,
                    })
                })
                .collect::<Result<Vec<_>, BitfontError>>()?;
            Ok(SizeBracket {
                from: *from,
                to: *to,
                pixel_density: *pixel_density,
                value,
            })
        })
        .collect()
}

fn parse_subsection(key: &str, body: &[&str], corrections: &mut FontCorrections) -> Result<(), BitfontError> {
    if key == "Kerning cutoff" {
        let line = body
            .iter()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| corrupted("Kerning cutoff subsection has no value"))?;
        corrections.kerning_cutoff = Some(parse_float(line, "Kerning cutoff")?);
        return Ok(());
    }

    let groups = group_by_header(body)?;

    match key {
        "Kerning" => corrections.kerning = parse_kerning_brackets(&groups)?,
        "ActualBoundingBoxLeft correction px" => {
            corrections.actual_bounding_box_left_correction_px = parse_scalar_brackets(&groups)?;
        }
        "ActualBoundingBoxRight correction px" => {
            corrections.actual_bounding_box_right_correction_px = parse_scalar_brackets(&groups)?;
        }
        "ActualBoundingBoxLeft correction proportional" => {
            corrections.actual_bounding_box_left_correction_proportional = parse_scalar_brackets(&groups)?;
        }
        "ActualBoundingBoxRight correction proportional" => {
            corrections.actual_bounding_box_right_correction_proportional = parse_scalar_brackets(&groups)?;
        }
        "Advancement correction proportional" => {
            corrections.advancement_correction_proportional = parse_scalar_brackets(&groups)?;
        }
        "CropLeft correction px" => {
            corrections.crop_left_correction_px = parse_character_indexed_brackets(&groups)?;
        }
        "Space advancement override for small sizes in px" => {
            corrections.space_advancement_override_for_small_sizes_px = parse_scalar_brackets(&groups)?;
        }
        "Advancement override for small sizes in px" => {
            corrections.advancement_override_for_small_sizes_px = parse_scalar_brackets(&groups)?;
        }
        "Kerning discretisation for small sizes" => {
            corrections.kerning_discretisation_for_small_sizes = parse_discretisation_brackets(&groups)?;
        }
        other => return Err(corrupted(format!("unrecognized correction key {other:?}"))),
    }

    Ok(())
}

fn parse_entry(block: &str) -> Result<((String, String, String), FontCorrections), BitfontError> {
    let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 3 {
        return Err(corrupted("entry is missing font family/style/weight header"));
    }

    let family = lines[0]
        .strip_prefix("Font family:")
        .ok_or_else(|| corrupted(format!("expected 'Font family:' line, found {:?}", lines[0])))?
        .trim()
        .to_string();
    let style = lines[1]
        .strip_prefix("Font style:")
        .ok_or_else(|| corrupted(format!("expected 'Font style:' line, found {:?}", lines[1])))?
        .trim()
        .to_string();
    let weight = lines[2]
        .strip_prefix("Font weight:")
        .ok_or_else(|| corrupted(format!("expected 'Font weight:' line, found {:?}", lines[2])))?
        .trim()
        .to_string();

    let rest: Vec<&str> = block
        .lines()
        .filter(|l| !l.trim().is_empty())
        .skip(3)
        .collect();

    let mut corrections = FontCorrections::default();

    for sub_lines in split_on_lines(&rest, is_subsection_separator) {
        if sub_lines.is_empty() {
            continue;
        }
        let key = sub_lines[0].trim();
        let marker = sub_lines
            .get(1)
            .ok_or_else(|| corrupted(format!("correction key {key:?} has no '-' marker line")))?;
        if marker.trim() != "-" {
            return Err(corrupted(format!("expected '-' after correction key {key:?}")));
        }
        parse_subsection(key, &sub_lines[2..], &mut corrections)?;
    }

    Ok(((family, style, weight), corrections))
}

/// Splits a slice of lines into groups, breaking before each line matching
/// `is_separator` (the separator line itself is dropped).
fn split_on_lines<'a>(lines: &[&'a str], is_separator: fn(&str) -> bool) -> Vec<Vec<&'a str>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for &line in lines {
        if is_separator(line) {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(line);
        }
    }
    groups.push(current);
    groups
}

/// Splits `text` on lines of 7+ dashes, then parses each block as one
/// `(family, style, weight)` entry.
pub fn parse_spec(text: &str) -> Result<Spec, BitfontError> {
    let mut spec = Spec::default();
    let mut current_block = String::new();

    let mut blocks = Vec::new();
    for line in text.lines() {
        if is_top_level_separator(line) {
            blocks.push(std::mem::take(&mut current_block));
        } else {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }
    blocks.push(current_block);

    for block in blocks {
        if block.trim().is_empty() {
            continue;
        }
        let (key, corrections) = parse_entry(&block)?;
        spec.entries.insert(key, corrections);
    }

    Ok(spec)
}
