mod collection_group_test;
mod collection_test;
mod concurrency_test;
