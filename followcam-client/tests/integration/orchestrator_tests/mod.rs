mod test_stale_connection_events;
mod test_viewer_answer_flow;
