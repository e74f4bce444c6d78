//! The person/relationship graph builder behind [`GedcomX`].
//!
//! Facts arrive in emission order, so every merge rule is "first wins, later
//! fills gaps". Persons live in one ordered store; every id a producer has
//! used for a person (its own and any alternates) is an entry in a separate
//! alias table pointing into that store.

use std::collections::HashMap;

use chrono::DateTime;
use genx_combinator::Assembler;
use genx_core::{
  fact::{
    AlternateIdData, CitationData, CoupleEvent, CoupleEventData, EventData,
    Fact as Observation, FactType, GenderData, LifeEvent, NameData,
    ParentEvent, ParentEventData, ValueData, ValuedFact,
  },
  id::PersonId,
};

use crate::{
  AssembleError, Result,
  model::{
    Agent, Document, Fact, Gender, GenderType, Name, Person, Relationship,
    RelationshipType, ResourceReference, SourceCitation, SourceDescription,
    SourceReference, TextValue,
  },
  name::name_form,
};

/// Id of the single repository agent.
const AGENT_ID: &str = "agent";

/// Assembles a GEDCOM X [`Document`] from an extraction's facts.
#[derive(Debug, Default)]
pub struct GedcomX {
  document: Document,
  /// Every known id → index into `document.persons`.
  aliases:  HashMap<PersonId, usize>,
}

impl GedcomX {
  pub fn new() -> Self { Self::default() }

  /// The document as assembled so far.
  pub fn document(&self) -> &Document { &self.document }

  /// Find or create the person known as `id`, returning its index.
  ///
  /// `primary` marks the person as the principal subject; the mark is never
  /// removed.
  pub fn person(&mut self, id: &PersonId, primary: bool) -> Result<usize> {
    if id.is_empty() {
      return Err(AssembleError::Missing(FactType::Person, "id"));
    }
    let index = match self.aliases.get(id) {
      Some(&index) => index,
      None => {
        self.document.persons.push(Person::new(id.clone()));
        let index = self.document.persons.len() - 1;
        self.aliases.insert(id.clone(), index);
        index
      }
    };
    if primary {
      self.document.persons[index].principal = Some(true);
    }
    Ok(index)
  }

  /// Let `data.id` resolve to the person known as `data.person`. A preferred
  /// alternate also becomes the person's visible id, and relationships are
  /// rewritten to match.
  pub fn alternate_id(&mut self, data: &AlternateIdData) -> Result<()> {
    if data.id.is_empty() {
      return Err(AssembleError::Missing(FactType::AlternateId, "id"));
    }
    let index = self.resolve(FactType::AlternateId, &data.person)?;

    match self.aliases.get(&data.id) {
      Some(&existing) if existing != index => {
        tracing::warn!(
          person = %data.person,
          alternate = %data.id,
          "alternate id already names another person; ignoring"
        );
        return Ok(());
      }
      Some(_) => {}
      None => {
        self.aliases.insert(data.id.clone(), index);
        self.document.persons[index].alternate_ids.push(data.id.clone());
      }
    }

    if data.preferred {
      let person = &mut self.document.persons[index];
      if person.id != data.id {
        let old = ResourceReference::to_person(&person.id);
        let new = ResourceReference::to_person(&data.id);
        person.id = data.id.clone();
        for relationship in &mut self.document.relationships {
          for end in [&mut relationship.person1, &mut relationship.person2] {
            if *end == old {
              *end = new.clone();
            }
          }
        }
      }
    }
    Ok(())
  }

  pub fn gender(&mut self, data: &GenderData) -> Result<()> {
    let gender_type: GenderType = data
      .gender
      .parse()
      .map_err(|_| AssembleError::InvalidGender(data.gender.clone()))?;
    let index = self.resolve(FactType::Gender, &data.person)?;
    self.document.persons[index].gender = Some(Gender { gender_type });
    Ok(())
  }

  /// Add a name unless the person already has one with the same full text.
  pub fn name(&mut self, data: &NameData) -> Result<()> {
    let index = self.resolve(FactType::Name, &data.person)?;
    let form = name_form(data)?;
    let person = &mut self.document.persons[index];

    let duplicate = person
      .names
      .iter()
      .flat_map(|n| &n.name_forms)
      .any(|f| f.full_text == form.full_text);
    if !duplicate {
      person.names.push(Name { name_forms: vec![form] });
    }
    Ok(())
  }

  /// Attach a fact to a person. A second Birth fills in the date and place of
  /// the first instead of adding another.
  pub fn fact(
    &mut self,
    fact_type: FactType,
    person: &PersonId,
    fact: Fact,
  ) -> Result<()> {
    let index = self.resolve(fact_type, person)?;
    let facts = &mut self.document.persons[index].facts;

    if fact_type == FactType::Parent(ParentEvent::Birth)
      && let Some(existing) =
        facts.iter_mut().find(|f| f.fact_type == fact.fact_type)
    {
      if existing.date.is_none() {
        existing.date = fact.date;
      }
      if existing.place.is_none() {
        existing.place = fact.place;
      }
      return Ok(());
    }

    facts.push(fact);
    Ok(())
  }

  /// Record a birth or adoption and link the person to up to two parents.
  pub fn parent_event(
    &mut self,
    kind: ParentEvent,
    data: &ParentEventData,
  ) -> Result<()> {
    let fact_type = FactType::Parent(kind);
    let child = self.resolve(fact_type, &data.person)?;

    let mut parents = Vec::new();
    for parent in data.parents.iter().flatten().take(2) {
      parents.push(self.resolve(fact_type, parent)?);
    }

    if data.place.is_some() || data.date.is_some() {
      let fact = Fact::new(
        kind.into(),
        data.date.as_deref(),
        data.place.as_deref(),
        None,
      );
      self.fact(fact_type, &data.person, fact)?;
    }

    let child = ResourceReference::to_person(&self.document.persons[child].id);
    for parent in parents {
      let parent =
        ResourceReference::to_person(&self.document.persons[parent].id);
      self.relationship(RelationshipType::ParentChild, parent, child.clone(), None);
    }
    Ok(())
  }

  /// Record a couple event: on the relationship when both spouses are
  /// known, on the lone spouse otherwise.
  pub fn couple_event(
    &mut self,
    kind: CoupleEvent,
    data: &CoupleEventData,
  ) -> Result<()> {
    let fact_type = FactType::Couple(kind);
    let (first, second) = match data.spouses.as_slice() {
      [] => return Err(AssembleError::Missing(fact_type, "spouses")),
      [only] => (only, None),
      [first, second, ..] => (first, Some(second)),
    };

    let first = self.resolve(fact_type, first)?;
    let second = second.map(|id| self.resolve(fact_type, id)).transpose()?;
    let fact = Fact::new(
      kind.into(),
      data.date.as_deref(),
      data.place.as_deref(),
      None,
    );

    match second {
      Some(second) => {
        let person1 = ResourceReference::to_person(&self.document.persons[first].id);
        let person2 =
          ResourceReference::to_person(&self.document.persons[second].id);
        self.relationship(RelationshipType::Couple, person1, person2, Some(fact));
      }
      None => self.document.persons[first].facts.push(fact),
    }
    Ok(())
  }

  /// Describe the cited record. The first citation also names the agent.
  pub fn citation(&mut self, data: &CitationData) {
    if self.document.agents.is_empty() {
      self.document.agents.push(Agent {
        id:       AGENT_ID.to_owned(),
        names:    data
          .repository_name
          .iter()
          .map(|name| TextValue { lang: Some("en".into()), value: name.clone() })
          .collect(),
        homepage: data.repository_url.as_deref().map(ResourceReference::new),
      });
    }

    let id = (self.document.source_descriptions.len() + 1).to_string();
    self.document.source_descriptions.push(SourceDescription {
      id,
      citations: vec![SourceCitation { value: citation_text(data) }],
      about: data.url.clone(),
      titles: vec![TextValue { lang: None, value: data.title.clone() }],
      repository: ResourceReference::new(format!("#{AGENT_ID}")),
    });
  }

  /// Point the document and every person and relationship at the first
  /// source description, if there is one.
  pub fn finalize(&mut self) {
    let Some(first) = self.document.source_descriptions.first() else {
      return;
    };
    let reference = format!("#{}", first.id);
    let sources = vec![SourceReference { description: reference.clone() }];

    self.document.description = Some(reference);
    for person in &mut self.document.persons {
      person.sources = sources.clone();
    }
    for relationship in &mut self.document.relationships {
      relationship.sources = sources.clone();
    }
  }

  /// Take the finished document, leaving an empty one behind.
  pub fn take_document(&mut self) -> Document {
    self.aliases.clear();
    std::mem::take(&mut self.document)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  fn resolve(&mut self, fact_type: FactType, id: &PersonId) -> Result<usize> {
    if id.is_empty() {
      return Err(AssembleError::Missing(fact_type, "person"));
    }
    self.person(id, false)
  }

  /// Add a relationship unless one with the same type and ends exists; in
  /// that case merge `fact` into it if it is a new event.
  fn relationship(
    &mut self,
    relationship_type: RelationshipType,
    person1: ResourceReference,
    person2: ResourceReference,
    fact: Option<Fact>,
  ) {
    let relationships = &mut self.document.relationships;
    match relationships
      .iter_mut()
      .find(|r| r.joins(relationship_type, &person1, &person2))
    {
      Some(existing) => {
        if let Some(fact) = fact
          && !existing.facts.iter().any(|f| f.same_event(&fact))
        {
          existing.facts.push(fact);
        }
      }
      None => relationships.push(Relationship {
        relationship_type,
        person1,
        person2,
        facts: fact.into_iter().collect(),
        sources: Vec::new(),
      }),
    }
  }

  fn life_event(&mut self, kind: LifeEvent, data: &EventData) -> Result<()> {
    let fact = Fact::new(kind.into(), data.date.as_deref(), data.place.as_deref(), None);
    self.fact(FactType::Life(kind), &data.person, fact)
  }

  fn valued_fact(&mut self, kind: ValuedFact, data: &ValueData) -> Result<()> {
    let value = Some(data.value.as_str()).filter(|v| !v.is_empty());
    let fact = Fact::new(kind.into(), data.date.as_deref(), data.place.as_deref(), value);
    self.fact(FactType::Valued(kind), &data.person, fact)
  }
}

/// `"<title>, <repository> (<url> : accessed <Www Mmm DD YYYY>)"`
fn citation_text(data: &CitationData) -> String {
  let mut text = data.title.clone();
  if let Some(repository) = &data.repository_name {
    text.push_str(", ");
    text.push_str(repository);
  }
  match DateTime::from_timestamp_millis(data.accessed) {
    Some(accessed) => text.push_str(&format!(
      " ({} : accessed {})",
      data.url,
      accessed.format("%a %b %d %Y")
    )),
    None => text.push_str(&format!(" ({})", data.url)),
  }
  text
}

// ─── Assembler impl ──────────────────────────────────────────────────────────

impl Assembler for GedcomX {
  type Error = AssembleError;
  type Output = Document;

  fn apply(&mut self, fact: &Observation) -> Result<()> {
    match fact {
      Observation::Person(data) => {
        self.person(&data.id, data.primary == Some(true)).map(|_| ())
      }
      Observation::Gender(data) => self.gender(data),
      Observation::Name(data) => self.name(data),
      Observation::AlternateId(data) => self.alternate_id(data),
      Observation::ExternalId(data) => {
        tracing::debug!(person = %data.person, url = %data.url, "ignoring external id");
        Ok(())
      }
      Observation::Citation(data) => {
        self.citation(data);
        Ok(())
      }
      Observation::Life(kind, data) => self.life_event(*kind, data),
      Observation::Valued(kind, data) => self.valued_fact(*kind, data),
      Observation::Parent(kind, data) => self.parent_event(*kind, data),
      Observation::Couple(kind, data) => self.couple_event(*kind, data),
    }
  }

  fn finalize(&mut self) { GedcomX::finalize(self); }

  fn serialize(&mut self) -> Result<Document> { Ok(self.take_document()) }
}
