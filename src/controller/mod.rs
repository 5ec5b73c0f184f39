pub mod resource_list;
