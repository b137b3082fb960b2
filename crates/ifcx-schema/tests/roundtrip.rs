//! Whole-file reading and writing of a small IFC4 project with one wall.

use approx::assert_relative_eq;
use ifcx_schema::ifc4;
use ifcx_step::{parse, Model, Reader, ReaderSettings, Value, WriterSettings};

const SIMPLE_WALL: &str = include_str!("fixtures/simple_wall.ifc");

fn read() -> Model {
    parse(ifc4().unwrap(), SIMPLE_WALL).unwrap()
}

#[test]
fn test_reads_whole_project() {
    let model = read();
    assert_eq!(model.len(), 44);
    assert_eq!(model.header().name, "simple_wall.ifc");
    assert_eq!(model.header().schema_identifiers, vec!["IFC4"]);
    assert_eq!(model.header().author, vec!["Jane Doe"]);

    let project = model.entities_of_type("IfcProject", false);
    assert_eq!(project.len(), 1);
    assert_eq!(
        project[0].get_attribute("Name").unwrap().as_str(),
        Some("Demo Project")
    );
    assert_eq!(model.entities_of_type("IfcSpatialStructureElement", true).len(), 3);
    assert_eq!(model.entities_of_type("IfcRoot", true).len(), 12);

    let wall = model.get(70).unwrap();
    assert_eq!(wall.type_name(), "IfcWall");
    assert!(wall.is_a("IfcBuildingElement"));
    assert_eq!(wall.get_attribute("Name").unwrap().as_str(), Some("Wall 'A'"));
    assert_eq!(wall.get_attribute("PredefinedType").unwrap().as_enum(), Some("STANDARD"));
    assert_eq!(
        wall.get_entity("OwnerHistory").unwrap().type_name(),
        "IfcOwnerHistory"
    );
}

#[test]
fn test_typed_values() {
    let model = read();

    let unit = model.get(10).unwrap();
    assert!(unit.get_attribute("Dimensions").unwrap().is_derived());
    assert_eq!(unit.get_attribute("Prefix").unwrap().as_enum(), Some("MILLI"));
    assert!(model.get(11).unwrap().get_attribute("Prefix").unwrap().is_null());

    let site = model.get(41).unwrap();
    let latitude: Vec<i64> = site
        .get_attribute("RefLatitude")
        .unwrap()
        .as_list()
        .unwrap()
        .iter()
        .filter_map(Value::as_integer)
        .collect();
    assert_eq!(latitude, vec![51, 30, 0]);
    assert_relative_eq!(site.get_attribute("RefElevation").unwrap().as_real().unwrap(), 12.5);

    let address = model.get(43).unwrap().get_entity("BuildingAddress").unwrap();
    assert_eq!(address.get_attribute("Town").unwrap().as_str(), Some("Z\u{fc}rich"));

    let context = model.get(24).unwrap();
    assert_eq!(
        context.get_attribute("CoordinateSpaceDimension").unwrap().as_integer(),
        Some(3)
    );
    assert_relative_eq!(context.get_attribute("Precision").unwrap().as_real().unwrap(), 1e-5);

    let points = model.get(97).unwrap();
    let rows = points.get_attribute("CoordList").unwrap().as_list().unwrap();
    assert_eq!(rows.len(), 3);
    assert_relative_eq!(rows[2].as_list().unwrap()[1].as_real().unwrap(), 1.0);
}

#[test]
fn test_select_values_keep_their_type() {
    let model = read();
    let schema = model.schema().clone();

    let external = model.get(90).unwrap().get_attribute("NominalValue").unwrap();
    assert_eq!(external.type_id(), schema.type_by_name("IfcBoolean"));
    assert_eq!(external.as_bool(), Some(true));

    let width = model.get(91).unwrap();
    let nominal = width.get_attribute("NominalValue").unwrap();
    assert_eq!(nominal.type_id(), schema.type_by_name("IfcPositiveLengthMeasure"));
    assert_relative_eq!(nominal.as_real().unwrap(), 200.0);
    assert_eq!(width.get_entity("Unit").unwrap().id(), 10);

    let reference = model.get(92).unwrap().get_attribute("NominalValue").unwrap();
    assert_eq!(reference.type_id(), schema.type_by_name("IfcIdentifier"));
    assert_eq!(reference.as_str(), Some("W\u{e9}-1"));

    let layers = model.get(93).unwrap().get_attribute("ListValues").unwrap();
    let names: Vec<&str> = layers.as_list().unwrap().iter().filter_map(Value::as_str).collect();
    assert_eq!(names, vec!["Core", "Finish"]);

    let ratio = model.get(98).unwrap().get_attribute("NominalValue").unwrap();
    assert_relative_eq!(ratio.as_real().unwrap(), 1.5e-10);

    let relating = model.get(81).unwrap().get_entity("RelatingMaterial").unwrap();
    assert_eq!(relating.type_name(), "IfcMaterial");
}

#[test]
fn test_written_lines() {
    let model = read();
    let line = |id: u64| model.write_entity(model.get(id).unwrap().key()).unwrap();

    assert_eq!(line(10), "#10=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);");
    assert_eq!(line(24), "#24=IFCGEOMETRICREPRESENTATIONCONTEXT($,'Model',3,1.E-5,#23,$);");
    assert_eq!(
        line(70),
        "#70=IFCWALL('2XQ$n5SLP5MBLyL442paFx',#5,'Wall ''A''',$,$,#66,#65,'W-001',.STANDARD.);"
    );
    assert_eq!(
        line(91),
        "#91=IFCPROPERTYSINGLEVALUE('Width',$,IFCPOSITIVELENGTHMEASURE(200.),#10);"
    );
    assert_eq!(
        line(92),
        r#"#92=IFCPROPERTYSINGLEVALUE('Reference',$,IFCIDENTIFIER('W\X2\00E9\X0\-1'),$);"#
    );
    assert_eq!(
        line(93),
        "#93=IFCPROPERTYLISTVALUE('Layers',$,(IFCLABEL('Core'),IFCLABEL('Finish')),$);"
    );
    assert_eq!(line(98), "#98=IFCPROPERTYSINGLEVALUE('Ratio',$,IFCREAL(1.5E-10),$);");
    assert_eq!(line(41).matches("(51,30,0),(-1,-15,0),12.5").count(), 1);
}

#[test]
fn test_round_trip_is_stable() {
    let settings = WriterSettings::default();
    let first = read().to_step(&settings).unwrap();
    let second = parse(ifc4().unwrap(), &first).unwrap().to_step(&settings).unwrap();
    assert_eq!(first, second);

    let reread = parse(ifc4().unwrap(), &first).unwrap();
    let original = read();
    assert_eq!(reread.len(), original.len());
    assert_eq!(reread.header(), original.header());
    for entity in original.entities() {
        let copy = reread.get(entity.id()).unwrap();
        assert_eq!(copy.type_name(), entity.type_name());
        assert_eq!(
            reread.write_entity(copy.key()).unwrap(),
            original.write_entity(entity.key()).unwrap()
        );
    }
}

#[test]
fn test_sequential_and_parallel_agree() {
    let settings = WriterSettings::default();
    let parallel = read().to_step(&settings).unwrap();
    let sequential = Reader::with_settings(ifc4().unwrap(), ReaderSettings::sequential())
        .unwrap()
        .parse(SIMPLE_WALL)
        .unwrap()
        .to_step(&settings)
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_reference_closure() {
    let model = read();
    for entity in model.entities() {
        for (_, value) in entity.attributes() {
            for target in value.refs() {
                let target = model.entity(target).expect("dangling reference");
                assert_eq!(model.id_table().get(target.id()), Some(target.key()));
            }
        }
    }
}
