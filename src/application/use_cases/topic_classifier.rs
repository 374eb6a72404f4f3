use crate::domain::reports::TopicTally;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_TOPIC: &str = "Otras Áreas";
pub const TOP_TOPICS: usize = 15;

/// Buckets in match order; the first bucket with a matching keyword wins.
pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("Robótica", &["robotica", "robot", "meca"]),
    ("Astronomía", &["astronomia", "espacio", "astros", "planeta"]),
    ("Ciencia para la Producción", &["produccion", "agro", "industria", "fabrica"]),
    (
        "Ciencia para la Computación",
        &["computacion", "programacion", "software", "informatica"],
    ),
    ("Biología y Salud", &["biologia", "salud", "medicina", "celulas"]),
    ("Química", &["quimica", "laboratorio", "molecula"]),
    ("Física", &["fisica", "energia", "cuantica"]),
    ("Matemáticas", &["matematica", "calculo", "algebra"]),
    ("Ciencias Sociales", &["sociales", "comunidad", "humanidades"]),
    ("Ecología y Ambiente", &["ambiente", "ecologia", "clima", "reciclaje"]),
    ("Electrónica", &["electronica", "circuitos", "sensores"]),
    ("Telecomunicaciones", &["telecomunicaciones", "redes", "satelite"]),
    ("Biotecnología", &["biotecnologia", "genetica", "adn"]),
    ("Innovación y Emprendimiento", &["innovacion", "emprendimiento", "startup"]),
    ("Ingeniería", &["ingenieria", "diseno", "prototipo"]),
];

/// Lower-case, decompose, and drop combining marks: "Robótica" -> "robotica".
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[derive(Debug, Clone)]
struct TopicBucket {
    name: String,
    keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TopicClassifier {
    buckets: Vec<TopicBucket>,
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(TOPIC_KEYWORDS)
    }
}

impl TopicClassifier {
    /// Keywords go through [`normalize_text`] too, so accented lists still match.
    pub fn new(buckets: &[(&str, &[&str])]) -> Self {
        let buckets = buckets
            .iter()
            .map(|(name, keywords)| TopicBucket {
                name: name.to_string(),
                keywords: keywords
                    .iter()
                    .map(|k| normalize_text(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { buckets }
    }

    /// Bucket for already-normalized text.
    pub fn classify(&self, normalized: &str) -> &str {
        self.buckets
            .iter()
            .find(|bucket| bucket.keywords.iter().any(|k| normalized.contains(k.as_str())))
            .map(|bucket| bucket.name.as_str())
            .unwrap_or(DEFAULT_TOPIC)
    }

    /// Bucket for one row's category values, missing values read as empty.
    pub fn classify_row(&self, categories: &[Option<String>]) -> &str {
        let joined = categories
            .iter()
            .map(|c| c.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ");
        self.classify(&normalize_text(&joined))
    }

    /// Rows per bucket, largest first (ties by name), capped at [`TOP_TOPICS`].
    pub fn tally<R>(&self, rows: &[R]) -> Vec<TopicTally>
    where
        R: AsRef<[Option<String>]>,
    {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for row in rows {
            *counts.entry(self.classify_row(row.as_ref())).or_insert(0) += 1;
        }

        let mut tallies: Vec<(&str, i64)> = counts.into_iter().collect();
        tallies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        tallies
            .into_iter()
            .take(TOP_TOPICS)
            .map(|(area, count)| TopicTally {
                area: area.to_string(),
                count,
                description: format!("Jóvenes participantes en el área de {}", area),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> [Option<String>; 4] {
        let mut out: [Option<String>; 4] = Default::default();
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = Some(value.to_string());
        }
        out
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(
            normalize_text("Robótica y Programación"),
            "robotica y programacion"
        );
        assert_eq!(normalize_text("DISEÑO Ñandú"), "diseno nandu");
    }

    #[test]
    fn test_first_bucket_wins() {
        let classifier = TopicClassifier::default();
        let text = normalize_text("Robótica y Programación");
        assert_eq!(classifier.classify(&text), "Robótica");
    }

    #[test]
    fn test_accented_keyword_matches() {
        let classifier = TopicClassifier::default();
        assert_eq!(
            classifier.classify_row(&row(&["Taller", "Diseño gráfico"])),
            "Ingeniería"
        );
    }

    #[test]
    fn test_unmatched_rows_fall_back() {
        let classifier = TopicClassifier::default();
        assert_eq!(classifier.classify_row(&row(&["Danza", "Teatro"])), DEFAULT_TOPIC);
        assert_eq!(classifier.classify_row(&[None, None, None, None]), DEFAULT_TOPIC);
    }

    #[test]
    fn test_tally_orders_by_count_then_name() {
        let classifier = TopicClassifier::default();
        let rows = vec![
            row(&["Química orgánica"]),
            row(&["Física"]),
            row(&["Robots"]),
            row(&["Química"]),
            row(&["Danza"]),
            row(&["Danza"]),
        ];

        let tally = classifier.tally(&rows);
        let areas: Vec<(&str, i64)> = tally.iter().map(|t| (t.area.as_str(), t.count)).collect();
        assert_eq!(
            areas,
            vec![
                ("Otras Áreas", 2),
                ("Química", 2),
                ("Física", 1),
                ("Robótica", 1),
            ]
        );
        assert_eq!(
            tally[1].description,
            "Jóvenes participantes en el área de Química"
        );
    }

    #[test]
    fn test_tally_caps_at_top_topics() {
        let names: Vec<String> = (0..20).map(|i| format!("tema{:02}", i)).collect();
        let table: Vec<(&str, &[&str])> = Vec::new();
        let mut classifier = TopicClassifier::new(&table);
        classifier.buckets = names
            .iter()
            .map(|name| TopicBucket {
                name: name.clone(),
                keywords: vec![name.clone()],
            })
            .collect();

        let rows: Vec<[Option<String>; 4]> = names.iter().map(|n| row(&[n.as_str()])).collect();
        assert_eq!(classifier.tally(&rows).len(), TOP_TOPICS);
    }
}
