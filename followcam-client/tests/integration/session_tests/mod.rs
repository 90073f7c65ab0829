mod test_open_sends_directory_request;
mod test_sender_session_flow;
