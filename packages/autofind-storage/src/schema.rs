/// The full schema with every `\ir` include inlined.
pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_vehicles.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_vehicles.sql")),
				"tables/002_options.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_options.sql")),
				"tables/003_vehicle_options.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_vehicle_options.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
