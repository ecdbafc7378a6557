mod acceptance {
	mod context_tracking;
	mod delivery;
	mod frequency;
	mod inventory;

	use admatch_service::AdRequest;

	pub fn request(query: &str, conversation_id: Option<&str>) -> AdRequest {
		AdRequest {
			query: query.to_string(),
			conversation_id: conversation_id.map(str::to_string),
			history: Vec::new(),
			user_context: None,
		}
	}
}
