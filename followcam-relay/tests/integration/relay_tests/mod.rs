mod test_offer_answer_exchange;
mod test_unroutable_messages_dropped;
