//! Name form synthesis.
//!
//! Producers send either a whole name, its parts, or both. The missing side is
//! derived from the other so every stored form has full text and parts.

use genx_core::fact::NameData;

use crate::{
  AssembleError, Result,
  model::{NameForm, NamePart, NamePartType},
};

pub(crate) fn name_form(data: &NameData) -> Result<NameForm> {
  let full = clean(&data.name);
  let mut given = clean(&data.given).map(str::to_owned);
  let mut surname = clean(&data.surname).map(str::to_owned);

  // A whole name alone: the last word is the surname, the rest is given.
  if let Some(full) = full
    && given.is_none()
    && surname.is_none()
  {
    let mut words: Vec<&str> = full.split_whitespace().collect();
    if words.len() > 1 {
      surname = words.pop().map(str::to_owned);
    }
    given = (!words.is_empty()).then(|| words.join(" "));
  }

  let parts: Vec<NamePart> = [
    (NamePartType::Prefix, clean(&data.prefix).map(str::to_owned)),
    (NamePartType::Given, given),
    (NamePartType::Surname, surname),
    (NamePartType::Suffix, clean(&data.suffix).map(str::to_owned)),
  ]
  .into_iter()
  .filter_map(|(part_type, value)| value.map(|value| NamePart { part_type, value }))
  .collect();

  let full_text = match full {
    Some(full) => full.to_owned(),
    None if !parts.is_empty() => parts
      .iter()
      .map(|p| p.value.as_str())
      .collect::<Vec<_>>()
      .join(" "),
    None => return Err(AssembleError::EmptyName),
  };

  Ok(NameForm { full_text, parts })
}

fn clean(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
