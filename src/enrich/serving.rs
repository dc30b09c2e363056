// src/enrich/serving.rs

use indicatif::ProgressBar;
use tracing::info;

use super::{map_text_column, words};
use crate::error::TableError;
use crate::label::ServingType;
use crate::table::{Table, Values};

const BOTTLE_WORDS: &[&str] = &["bottle", "bottled", "bottles", "bomber", "longneck", "stubby"];
const CAN_WORDS: &[&str] = &["cans", "canned", "tallboy", "tallboys"];
const DRAFT_WORDS: &[&str] = &["draft", "draught", "tap", "taps", "cask", "growler", "nitro"];

/// Words that make a following "can" the container rather than the verb.
const CAN_DETERMINERS: &[&str] = &["a", "the", "this", "from", "of", "oz", "ml", "cl"];

/// Guess the serving type from review text.
///
/// Exactly one category's keywords must appear; no match or a mix of
/// categories leaves the row `not_set` for a person to decide.
pub fn guess_serving_type(text: &str) -> ServingType {
    let tokens: Vec<String> = words(text).collect();
    let (mut bottle, mut can, mut draft) = (false, false, false);

    for (i, tok) in tokens.iter().enumerate() {
        let t = tok.as_str();
        if BOTTLE_WORDS.contains(&t) {
            bottle = true;
        } else if DRAFT_WORDS.contains(&t) {
            draft = true;
        } else if CAN_WORDS.contains(&t)
            || (t == "can" && i > 0 && CAN_DETERMINERS.contains(&tokens[i - 1].as_str()))
        {
            can = true;
        }
    }

    match (bottle, can, draft) {
        (true, false, false) => ServingType::Bottle,
        (false, true, false) => ServingType::Can,
        (false, false, true) => ServingType::Draft,
        _ => ServingType::NotSet,
    }
}

/// Append a text column of serving-type guesses.
#[tracing::instrument(level = "info", skip(table, progress))]
pub fn add_serving_type_column(
    table: &mut Table,
    text_column: &str,
    output_column: &str,
    progress: &ProgressBar,
) -> Result<(), TableError> {
    if table.column(output_column).is_some() {
        return Err(TableError::DuplicateColumn(output_column.to_string()));
    }

    let guesses: Vec<String> = map_text_column(table, text_column, progress, |t| {
        guess_serving_type(t).as_str().to_string()
    })?;
    let unset = guesses.iter().filter(|g| *g == ServingType::NOT_SET).count();
    table.push_column(output_column, Values::Utf8(guesses))?;

    info!(rows = table.num_rows(), unset, "guessed serving types");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn single_category_wins() {
        assert_eq!(
            guess_serving_type("Poured from a 22oz bomber into a tulip."),
            ServingType::Bottle
        );
        assert_eq!(guess_serving_type("12oz can, poured into a pint."), ServingType::Can);
        assert_eq!(guess_serving_type("Had this on tap at the brewpub."), ServingType::Draft);
        assert_eq!(guess_serving_type("On cask. Lovely."), ServingType::Draft);
    }

    #[test]
    fn verb_can_is_ignored() {
        assert_eq!(
            guess_serving_type("I can taste caramel and you can smell it."),
            ServingType::NotSet
        );
    }

    #[test]
    fn mixed_or_absent_is_not_set() {
        assert_eq!(
            guess_serving_type("Tried it on draft and from the bottle."),
            ServingType::NotSet
        );
        assert_eq!(guess_serving_type("Dark red, beige foam."), ServingType::NotSet);
        assert_eq!(guess_serving_type(""), ServingType::NotSet);
    }

    #[test]
    fn column_is_appended() {
        let mut table = Table::from_columns(vec![Column {
            name: "review/text".into(),
            values: Values::Utf8(vec!["from the can".into(), "no idea".into()]),
        }])
        .unwrap();

        add_serving_type_column(&mut table, "review/text", "serving_type", &ProgressBar::hidden())
            .unwrap();
        assert_eq!(
            table.text_column("serving_type").unwrap(),
            &["can", "not_set"]
        );
    }
}
