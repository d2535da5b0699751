//! Free-text question classification.
//!
//! The taxonomy is an ordered list of rules. Each rule lists keyword groups that
//! must all be present (a group is satisfied by any one of its synonyms) and the
//! parameters the intent accepts. Rules with more groups are more specific and
//! are tried first; among rules with the same group count the declared order
//! below decides. The first rule that fully matches wins.
//!
//! Synonyms are matched against normalized tokens (see [`crate::text`]). A
//! synonym may be a multi-word phrase, and a trailing `*` marks a prefix stem.

use regex::Regex;
use std::cmp::Reverse;
use tracing::debug;

use crate::dataset::{Dataset, Domain};
use crate::intent::{Intent, IntentTag, ParamKind, Parameters};
use crate::text::{self, contains_phrase, token_matches};

/// One classification rule.
#[derive(Debug)]
pub struct IntentRule {
  pub tag: IntentTag,
  pub groups: &'static [&'static [&'static str]],
  pub params: &'static [ParamKind],
}

impl IntentRule {
  /// All groups satisfied by at least one synonym.
  pub fn matches(&self, tokens: &[String]) -> bool {
    self.groups.iter().all(|group| group.iter().any(|synonym| contains_phrase(tokens, synonym)))
  }

  pub fn accepts(&self, param: ParamKind) -> bool {
    self.params.contains(&param)
  }
}

use ParamKind::{City, OrderType, TopK, VehicleType};

const TAXONOMY: &[IntentRule] = &[
  // three groups
  IntentRule {
    tag: IntentTag::TopRatedFastest,
    groups: &[
      &["highest", "top", "best", "most"],
      &["rating*", "rated"],
      &["fastest", "quickest", "fast", "quick*", "speed*"],
    ],
    params: &[City, VehicleType, TopK],
  },
  // two groups
  IntentRule {
    tag: IntentTag::VehicleConditionEffect,
    groups: &[&["vehicle*"], &["condition*", "maintenance", "maintained", "wear"]],
    params: &[City, OrderType],
  },
  IntentRule {
    tag: IntentTag::VehicleEfficiency,
    groups: &[
      &["vehicle*"],
      &["efficien*", "fastest", "quickest", "fast", "faster", "best", "perform*", "speed*", "quick*"],
    ],
    params: &[City, OrderType],
  },
  IntentRule {
    tag: IntentTag::FastestPersonnel,
    groups: &[
      &["fastest", "quickest", "speediest"],
      &[
        "person", "persons", "personnel", "people", "rider*", "driver*", "courier*", "partner*",
        "agent*", "executive*", "staff", "who", "average", "avg", "mean",
      ],
    ],
    params: &[City, VehicleType, OrderType, TopK],
  },
  IntentRule {
    tag: IntentTag::MultiDeliveryEffect,
    groups: &[
      &["multiple", "multi", "several", "batched", "batching", "stacked", "concurrent", "simultaneous"],
      &["deliver*", "order*", "drop*", "stop*"],
    ],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::OrderTypeDuration,
    groups: &[&["order*"], &["type*", "kind*", "categor*", "sort*", "longest"]],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::HighestRated,
    groups: &[&["highest", "top", "best"], &["rating*", "rated"]],
    params: &[City, VehicleType, TopK],
  },
  IntentRule {
    tag: IntentTag::LocationTimeDiff,
    groups: &[
      &["restaurant*", "pickup", "origin*"],
      &["location*", "address*", "destination*", "coordinate*", "position*", "place*", "drop*"],
    ],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::AreaDelayRanking,
    groups: &[
      &[
        "area*", "region*", "zone*", "neighbourhood*", "neighborhood*", "localit*", "city", "cities",
        "place*",
      ],
      &["delay*", "slowest", "slow", "slower", "late", "lateness"],
    ],
    params: &[VehicleType, OrderType, TopK],
  },
  IntentRule {
    tag: IntentTag::DistanceDurationCorrelation,
    groups: &[
      &["distance*", "far", "farther", "further", "km", "kilomet*", "mile*"],
      &["time*", "duration*", "correlat*", "relationship", "relate*", "affect*", "impact*", "long*", "take*"],
    ],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::AvgDurationByCity,
    groups: &[&["average", "avg", "mean", "typical"], &["city", "cities"]],
    params: &[City, VehicleType, OrderType],
  },
  // one group
  IntentRule {
    tag: IntentTag::TimeOfDayEffect,
    groups: &[&[
      "order time", "ordering time", "order hour*", "time of day", "time of order*", "hour of day",
      "time ordered", "when ordered", "peak hour*", "rush hour*", "morning", "afternoon", "evening",
      "night",
    ]],
    params: &[City, VehicleType, OrderType],
  },
  IntentRule {
    tag: IntentTag::FestivalDelay,
    groups: &[&["festival*", "holiday*", "festive"]],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::TrafficEffect,
    groups: &[&["traffic", "congest*", "jam", "jams", "jammed"]],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::WeatherEffect,
    groups: &[&[
      "weather", "rain*", "storm*", "sandstorm*", "fog*", "sunny", "cloud*", "wind*", "climate",
    ]],
    params: &[City, VehicleType],
  },
  IntentRule {
    tag: IntentTag::AgeSpeedCorrelation,
    groups: &[&["age", "aged", "ages", "older", "younger", "old", "young"]],
    params: &[City, VehicleType],
  },
];

/// Vehicle words recognized even when the dataset has no such vehicle.
const VEHICLE_VOCABULARY: &[(&str, &str)] = &[
  ("motorcycle*", "motorcycle"),
  ("motorbike*", "motorcycle"),
  ("bike", "motorcycle"),
  ("bikes", "motorcycle"),
  ("electric scooter*", "electric_scooter"),
  ("e scooter*", "electric_scooter"),
  ("scooter*", "scooter"),
  ("bicycle*", "bicycle"),
  ("cycle", "bicycle"),
  ("cycles", "bicycle"),
  ("van", "van"),
  ("vans", "van"),
  ("car", "car"),
  ("cars", "car"),
  ("truck*", "truck"),
];

/// Order words recognized even when the dataset has no such order type.
const ORDER_VOCABULARY: &[(&str, &str)] = &[
  ("snack*", "snack"),
  ("meal*", "meal"),
  ("drink*", "drinks"),
  ("beverage*", "drinks"),
  ("buffet*", "buffet"),
];

/// Words that introduce an unknown city name.
const CITY_PREPOSITIONS: &[&str] = &["in", "from"];

/// Common words that never form part of a city name.
const FILLER_WORDS: &[&str] = &[
  "a", "all", "an", "and", "any", "are", "as", "at", "be", "by", "case", "different", "do", "does", "during",
  "each", "every", "for", "general", "how", "i", "is", "it", "its", "me", "my", "now", "of", "on", "or",
  "our", "overall", "particular", "please", "s", "terms", "than", "that", "the", "their", "there", "these",
  "this", "those", "to", "today", "total", "us", "various", "versus", "vs", "was", "we", "were", "what",
  "when", "where", "which", "while", "who", "why", "with", "you", "your",
];

const MAX_CITY_WORDS: usize = 3;

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Outcome of classifying one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
  Matched(Intent),
  Unmatched,
}

impl Classification {
  pub fn intent(&self) -> Option<&Intent> {
    match self {
      Classification::Matched(intent) => Some(intent),
      Classification::Unmatched => None,
    }
  }
}

/// Phrase to value lookup, longest phrases first.
#[derive(Debug, Clone, Default)]
struct ValueLookup {
  entries: Vec<(String, String)>,
}

impl ValueLookup {
  fn build(domain: &Domain, vocabulary: &[(&str, &str)]) -> Self {
    let mut entries: Vec<(String, String)> =
      domain.entries().map(|(normalized, canonical)| (normalized.to_string(), canonical.to_string())).collect();
    entries.extend(vocabulary.iter().map(|(pattern, value)| {
      let canonical = domain.resolve(value).unwrap_or(*value);
      (pattern.to_string(), canonical.to_string())
    }));

    entries.sort_by(|a, b| {
      let a_len = a.0.split_whitespace().count();
      let b_len = b.0.split_whitespace().count();
      Reverse(a_len).cmp(&Reverse(b_len)).then_with(|| a.0.cmp(&b.0))
    });

    Self { entries }
  }

  fn find(&self, tokens: &[String]) -> Option<String> {
    self
      .entries
      .iter()
      .find(|(phrase, _)| contains_phrase(tokens, phrase))
      .map(|(_, value)| value.clone())
  }

  /// Whether `word` appears anywhere in a known phrase.
  fn contains_word(&self, word: &str) -> bool {
    self.entries.iter().any(|(phrase, _)| phrase.split_whitespace().any(|part| token_matches(word, part)))
  }
}

/// Maps free-text questions onto the closed intent taxonomy.
#[derive(Debug)]
pub struct IntentClassifier {
  rules: Vec<&'static IntentRule>,
  cities: ValueLookup,
  vehicles: ValueLookup,
  orders: ValueLookup,
  top_k_hint: Regex,
  max_top_k: usize,
}

impl IntentClassifier {
  /// Build a classifier whose parameter lookups know the dataset's values.
  pub fn for_dataset(dataset: &Dataset, max_top_k: usize) -> Self {
    let mut rules: Vec<&'static IntentRule> = TAXONOMY.iter().collect();
    // stable: equal group counts keep their declared order
    rules.sort_by_key(|rule| Reverse(rule.groups.len()));

    Self {
      rules,
      cities: ValueLookup::build(dataset.cities(), &[]),
      vehicles: ValueLookup::build(dataset.vehicle_types(), VEHICLE_VOCABULARY),
      orders: ValueLookup::build(dataset.order_types(), ORDER_VOCABULARY),
      top_k_hint: Regex::new(
        r"\btop (\d{1,4})\b|\b(\d{1,4}) (?:fastest|quickest|best|highest|slowest|worst|top|most)\b",
      )
      .expect("top-k pattern is valid"),
      max_top_k: max_top_k.max(1),
    }
  }

  /// Rules in the order they are tried.
  pub fn rules(&self) -> &[&'static IntentRule] {
    &self.rules
  }

  pub fn classify(&self, query: &str) -> Classification {
    let tokens = text::tokenize(query);

    let Some(rule) = self.rules.iter().find(|rule| rule.matches(&tokens)) else {
      debug!(query, "question matched no intent");
      return Classification::Unmatched;
    };

    let params = self.extract_params(rule, &tokens);
    debug!(query, intent = %rule.tag, ?params, "classified question");
    Classification::Matched(Intent::with_params(rule.tag, params))
  }

  fn extract_params(&self, rule: &IntentRule, tokens: &[String]) -> Parameters {
    Parameters {
      city: rule.accepts(City).then(|| self.extract_city(tokens)).flatten(),
      vehicle_type: rule.accepts(VehicleType).then(|| self.vehicles.find(tokens)).flatten(),
      order_type: rule.accepts(OrderType).then(|| self.orders.find(tokens)).flatten(),
      top_k: rule.accepts(TopK).then(|| self.extract_top_k(tokens)).flatten(),
    }
  }

  /// Known city first, then the name-like words following `in` or `from`.
  fn extract_city(&self, tokens: &[String]) -> Option<String> {
    if let Some(city) = self.cities.find(tokens) {
      return Some(city);
    }

    tokens
      .iter()
      .enumerate()
      .filter(|(_, token)| CITY_PREPOSITIONS.contains(&token.as_str()))
      .find_map(|(i, _)| {
        let name: Vec<&String> = tokens[i + 1..]
          .iter()
          .skip_while(|word| FILLER_WORDS.contains(&word.as_str()))
          .take_while(|word| self.is_name_word(word))
          .take(MAX_CITY_WORDS)
          .collect();
        (!name.is_empty()).then(|| name.iter().map(|word| capitalize(word)).collect::<Vec<_>>().join(" "))
      })
  }

  /// Neither filler, number, preposition, taxonomy keyword nor vehicle/order word.
  fn is_name_word(&self, word: &str) -> bool {
    !FILLER_WORDS.contains(&word)
      && !CITY_PREPOSITIONS.contains(&word)
      && !word.chars().all(|c| c.is_ascii_digit())
      && !self.is_keyword(word)
      && !self.vehicles.contains_word(word)
      && !self.orders.contains_word(word)
  }

  fn is_keyword(&self, word: &str) -> bool {
    self.rules.iter().any(|rule| {
      rule
        .groups
        .iter()
        .flat_map(|group| group.iter())
        .flat_map(|synonym| synonym.split_whitespace())
        .any(|part| token_matches(word, part))
    })
  }

  fn extract_top_k(&self, tokens: &[String]) -> Option<usize> {
    let normalized = tokens.join(" ");
    let caps = self.top_k_hint.captures(&normalized)?;
    let digits = caps.get(1).or_else(|| caps.get(2))?;
    let k: usize = digits.as_str().parse().ok()?;
    Some(k.clamp(1, self.max_top_k))
  }
}
