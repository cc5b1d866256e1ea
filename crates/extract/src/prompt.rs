use crate::class_labels::ClassLabels;
use crate::normalizer::DisclaimerSet;
use crate::schema::{CanonicalField, ParsedFields};

/// Fixed-order summarizer input: class, Swedish description, terrain, orientation.
///
/// Returns `None` when the description is empty once disclaimers are removed;
/// such records are never sent to the summarizer.
pub fn build_description_input(
    fields: &ParsedFields,
    class_labels: &ClassLabels,
    disclaimers: &DisclaimerSet,
) -> Option<String> {
    let description = disclaimers.strip(fields.text(CanonicalField::DescriptionSv));
    if description.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let class_line = class_labels.display(fields.text(CanonicalField::Class));
    if !class_line.is_empty() {
        parts.push(class_line);
    }
    parts.push(format!("Description (sv): {description}"));

    let terrain = fields.text(CanonicalField::Terrain).trim();
    if !terrain.is_empty() {
        parts.push(format!("Terrain (sv): {terrain}"));
    }
    let orientation = fields.text(CanonicalField::Orientation).trim();
    if !orientation.is_empty() {
        parts.push(format!("Orientation (sv): {orientation}"));
    }

    Some(parts.join("\n"))
}

pub fn build_summary_prompt(description_input: &str) -> String {
    format!(
        r#"Write a concise description in English (1-3 sentences) for visitors.
Use the details under "Description (sv)" first (type, size, shape, structure, features, vegetation).
Add terrain/orientation only if space allows.
Do NOT include any headers like 'Site description:' or repeat the classification.
Do NOT mention reference numbers, status, verification, or data quality.
Return ONLY the description text.

Input:
{}
"#,
        description_input
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use CanonicalField::*;

    fn fields(pairs: &[(CanonicalField, &str)]) -> ParsedFields {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn assembles_in_fixed_order() {
        let input = build_description_input(
            &fields(&[
                (Orientation, "200 m N om gården"),
                (Terrain, "Moränmark"),
                (DescriptionSv, "Rund, 5 m diam."),
                (Class, "Stensättning"),
            ]),
            &ClassLabels::default(),
            &DisclaimerSet::default(),
        )
        .unwrap();

        assert_eq!(
            input,
            "Stensättning (Stone setting)\nDescription (sv): Rund, 5 m diam.\n\
             Terrain (sv): Moränmark\nOrientation (sv): 200 m N om gården"
        );
    }

    #[test]
    fn empty_description_yields_no_input() {
        let labels = ClassLabels::default();
        let disclaimers = DisclaimerSet::default();
        assert!(build_description_input(&fields(&[(Class, "Röse")]), &labels, &disclaimers).is_none());
        assert!(
            build_description_input(
                &fields(&[(DescriptionSv, "Beskrivningen är inte kvalitetssäkrad.")]),
                &labels,
                &disclaimers
            )
            .is_none()
        );
    }

    #[test]
    fn disclaimers_are_removed_from_the_input() {
        let input = build_description_input(
            &fields(&[(DescriptionSv, "Röse, 8 m diam. Beskrivningen är inte kvalitetssäkrad.")]),
            &ClassLabels::default(),
            &DisclaimerSet::default(),
        )
        .unwrap();
        assert_eq!(input, "Description (sv): Röse, 8 m diam.");
    }

    #[test]
    fn prompt_embeds_the_input() {
        let prompt = build_summary_prompt("Description (sv): Röse.");
        assert!(prompt.contains("Input:\nDescription (sv): Röse."));
        assert!(prompt.starts_with("Write a concise description in English"));
    }
}
