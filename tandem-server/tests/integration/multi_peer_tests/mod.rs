mod test_participant_listing;
