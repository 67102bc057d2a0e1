use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Folds a label for lookup: strips diacritics, lowercases, and keeps only alphanumerics, so
/// "Semi-novo", "seminovo" and "SEMI NOVO" share one key.
pub fn fold_label(raw: &str) -> String {
	raw.nfd()
		.filter(|c| !is_combining_mark(*c))
		.filter(|c| c.is_alphanumeric())
		.flat_map(char::to_lowercase)
		.collect()
}

/// First entry of `known` equal to `candidate` ignoring case, else the first entry where either
/// side contains the other ignoring case. Scans in iteration order.
pub fn first_match<'a, I>(candidate: &str, known: I) -> Option<&'a str>
where
	I: Iterator<Item = &'a str> + Clone,
{
	let needle = candidate.trim().to_lowercase();

	if needle.is_empty() {
		return None;
	}

	known.clone().find(|name| name.to_lowercase() == needle).or_else(|| {
		known.into_iter().find(|name| {
			let name = name.to_lowercase();

			name.contains(&needle) || needle.contains(&name)
		})
	})
}
