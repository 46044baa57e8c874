//! Role classification for multi-input jobs.

use ffgate_models::{InputFile, MediaRole};

use crate::error::{JobError, JobResult, ReceivedFile};

const VOCALS_PATTERNS: &[&str] = &["vocal", "voice", "acapella", "a_cappella", "vox"];
const BACKGROUND_PATTERNS: &[&str] = &["background", "instrumental", "backing", "bed", "beat", "bg"];

/// MIME type of an input, guessed from its name when the client sent a generic one.
pub fn effective_mime(file: &InputFile) -> String {
    let declared = file.mime_type.trim().to_lowercase();
    if !declared.is_empty() && declared != "application/octet-stream" {
        return declared;
    }
    mime_guess::from_path(&file.original_name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or(declared)
}

/// Most specific role for a file: declared role, then field name, then MIME
/// prefix. Audio files (or files of unknown type) are further narrowed by
/// file-name pattern.
pub fn classify(file: &InputFile) -> MediaRole {
    if let Some(role) = file.role {
        return role;
    }
    if let Ok(role) = file.fieldname.parse::<MediaRole>() {
        return role;
    }

    let mime = effective_mime(file);
    if mime.starts_with("image/") {
        return MediaRole::Image;
    }
    let is_audio = mime.starts_with("audio/");
    if !is_audio && !is_unknown_mime(&mime) {
        return MediaRole::Unclassified;
    }

    match role_from_name(&file.original_name) {
        Some(role) => role,
        None if is_audio => MediaRole::Audio,
        None => MediaRole::Unclassified,
    }
}

fn is_unknown_mime(mime: &str) -> bool {
    mime.is_empty() || mime == "application/octet-stream"
}

fn role_from_name(original_name: &str) -> Option<MediaRole> {
    let name = original_name.to_lowercase();
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&name);
    let words: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| VOCALS_PATTERNS.iter().any(|p| w.starts_with(p))) {
        return Some(MediaRole::Vocals);
    }
    let background = |w: &&str| {
        BACKGROUND_PATTERNS
            .iter()
            .any(|p| if p.len() <= 4 { w == p } else { w.starts_with(p) })
    };
    words.iter().any(background).then_some(MediaRole::Background)
}

/// Whether a file classified as `detected` may fill `wanted` when nothing matches exactly.
fn compatible(detected: MediaRole, wanted: MediaRole) -> bool {
    matches!(
        (detected, wanted),
        (MediaRole::Background | MediaRole::Vocals, MediaRole::Audio)
            | (MediaRole::Audio, MediaRole::Background | MediaRole::Vocals)
    )
}

/// Input indices assigned to each required role, in the order the roles were listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoles {
    assignments: Vec<(MediaRole, usize)>,
}

impl ResolvedRoles {
    pub fn index_of(&self, role: MediaRole) -> Option<usize> {
        self.assignments.iter().find(|(r, _)| *r == role).map(|(_, i)| *i)
    }
}

/// Assign each required role to a distinct input.
///
/// Exact matches are taken first; a second pass lets generic audio fill
/// background/vocals slots (and vice versa). Unfilled roles fail with a
/// listing of every received file and its detected type.
pub fn resolve_roles(files: &[InputFile], required: &[MediaRole]) -> JobResult<ResolvedRoles> {
    let detected: Vec<MediaRole> = files.iter().map(classify).collect();
    let mut taken = vec![false; files.len()];
    let mut slots: Vec<Option<usize>> = vec![None; required.len()];

    for (slot, wanted) in slots.iter_mut().zip(required) {
        if let Some(idx) = (0..files.len()).find(|&i| !taken[i] && detected[i] == *wanted) {
            taken[idx] = true;
            *slot = Some(idx);
        }
    }

    for (slot, wanted) in slots.iter_mut().zip(required) {
        if slot.is_some() {
            continue;
        }
        if let Some(idx) = (0..files.len()).find(|&i| !taken[i] && compatible(detected[i], *wanted)) {
            taken[idx] = true;
            *slot = Some(idx);
        }
    }

    let missing: Vec<&str> = slots
        .iter()
        .zip(required)
        .filter(|(slot, _)| slot.is_none())
        .map(|(_, role)| role.as_str())
        .collect();

    if !missing.is_empty() {
        let wanted: Vec<&str> = required.iter().map(MediaRole::as_str).collect();
        let received = files
            .iter()
            .zip(&detected)
            .map(|(file, role)| ReceivedFile {
                name: file.original_name.clone(),
                mime_type: effective_mime(file),
                detected_role: role.to_string(),
            })
            .collect();
        return Err(JobError::role_resolution(
            format!(
                "Both {} files are required (missing: {})",
                wanted.join(" and "),
                missing.join(", ")
            ),
            received,
        ));
    }

    Ok(ResolvedRoles {
        assignments: required
            .iter()
            .zip(slots)
            .filter_map(|(role, slot)| slot.map(|idx| (*role, idx)))
            .collect(),
    })
}
