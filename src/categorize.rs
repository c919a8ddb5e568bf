/// Label assigned when no rule matches.
pub const DEFAULT_CATEGORY: &str = "Otros";

/// One classification rule: any keyword contained in the uppercased
/// description assigns the label.
struct Rule {
    label: &'static str,
    keywords: &'static [&'static str],
}

/// Ordered rule table, evaluated top to bottom; the first match wins.
///
/// The order is part of the contract: `Devoluciones` sits first so a refund
/// line mentioning a merchant (`NOTA DE CREDITO JUMBO`) is a refund, not a
/// supermarket charge. Reordering changes classification results.
const RULES: &[Rule] = &[
    Rule {
        label: "Devoluciones",
        keywords: &["NOTA DE CREDITO", "NOTA DE CRÉDITO", "DEVOLUCION", "DEVOLUCIÓN"],
    },
    Rule {
        label: "Transporte",
        keywords: &["UBER", "CABIFY", "TAXI"],
    },
    Rule {
        label: "Supermercado",
        keywords: &["JUMBO", "LIDER", "UNIMARC", "SUPER", "MERCADO"],
    },
    Rule {
        label: "Suscripciones",
        keywords: &["NETFLIX", "SPOTIFY", "YOUTUBE", "HBO"],
    },
    Rule {
        label: "Salud",
        keywords: &["FARMACIA", "CRUZ VERDE", "AHUMADA"],
    },
    Rule {
        label: "Comida",
        keywords: &["REST", "CAFÉ", "BAR", "BURG", "KFC", "PIZZA", "MCDON", "DOMINO"],
    },
    Rule {
        label: "Abono",
        keywords: &["ABONO", "TRANSFERENCIA", "PAGO RECIB"],
    },
];

/// Assigns a spending category to a transaction description.
///
/// Pure and deterministic: the same description always yields the same
/// label. Matching is case-insensitive substring containment.
pub fn categorize(description: &str) -> &'static str {
    let haystack = description.to_uppercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k)))
        .map(|rule| rule.label)
        .unwrap_or(DEFAULT_CATEGORY)
}
